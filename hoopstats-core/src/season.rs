//! Season data assembly: one stats table plus the season's charts.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::{ChartLayout, SiteConfig};
use crate::contract::StoreBackend;
use crate::error::DataError;
use crate::keys::{plot_file_name, ArtifactKeys, SeasonId};
use crate::store::ObjectStoreClient;
use crate::tabular::{decode_rows, decode_table, PositionalOptions, StatsTable};

/// A chart as handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Chart {
    /// Chart-definition document, passed through exactly as decoded.
    Document {
        name: String,
        key: String,
        spec: Value,
    },
    /// Pre-rendered image served from the bucket.
    Image { name: String, url: String },
}

impl Chart {
    pub fn name(&self) -> &str {
        match self {
            Chart::Document { name, .. } | Chart::Image { name, .. } => name,
        }
    }
}

/// The season's stats table, typed by header or kept as rounded positional
/// rows depending on the artifact generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeasonStats {
    Table(StatsTable),
    /// Header row first, then one row per team.
    Rows(Vec<Vec<String>>),
}

impl SeasonStats {
    pub fn as_table(&self) -> Option<&StatsTable> {
        match self {
            SeasonStats::Table(table) => Some(table),
            SeasonStats::Rows(_) => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Vec<String>]> {
        match self {
            SeasonStats::Rows(rows) => Some(rows),
            SeasonStats::Table(_) => None,
        }
    }

    /// Number of team rows, header excluded.
    pub fn team_count(&self) -> usize {
        match self {
            SeasonStats::Table(table) => table.rows.len(),
            SeasonStats::Rows(rows) => rows.len().saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonRecord {
    pub league: String,
    pub year: String,
    pub season_type: String,
    pub stats: SeasonStats,
    pub charts: Vec<Chart>,
}

/// Chart names published for each layout, in display order.
pub fn chart_names(layout: ChartLayout) -> &'static [&'static str] {
    match layout {
        ChartLayout::Combined => &["stats"],
        ChartLayout::Split | ChartLayout::Images => &["ratings", "paces"],
    }
}

pub struct SeasonAssembler<'a, B> {
    config: &'a SiteConfig,
    store: &'a ObjectStoreClient<B>,
}

impl<'a, B: StoreBackend> SeasonAssembler<'a, B> {
    pub fn new(config: &'a SiteConfig, store: &'a ObjectStoreClient<B>) -> Self {
        Self { config, store }
    }

    fn keys(&self) -> ArtifactKeys<'a> {
        ArtifactKeys::new(&self.config.root_key)
    }

    /// Fetch and decode everything a season page shows. Nothing is cached;
    /// every call goes back to the store.
    pub async fn get_season_data(&self, season: &SeasonId) -> Result<SeasonRecord, DataError> {
        let stats = self.fetch_stats(season).await?;
        let charts = self.fetch_charts(season).await?;

        info!(
            league = %season.league,
            year = %season.year,
            season_type = %season.season_type,
            teams = stats.team_count(),
            charts = charts.len(),
            "Assembled season data"
        );

        Ok(SeasonRecord {
            league: season.league.clone(),
            year: season.year.clone(),
            season_type: season.season_type.clone(),
            stats,
            charts,
        })
    }

    /// Image-era artifacts are decoded positionally and rounded; the others
    /// are typed by header.
    pub async fn fetch_stats(&self, season: &SeasonId) -> Result<SeasonStats, DataError> {
        let key = self.keys().stats_key(season);
        let raw = self
            .store
            .get_object_string(&self.config.region, &self.config.bucket, &key)
            .await?;

        let decoded = match self.config.chart_layout {
            ChartLayout::Images => decode_rows(
                &raw,
                PositionalOptions {
                    drop_trailing: self.config.stats_drop_trailing,
                    ..PositionalOptions::default()
                },
            )
            .map(SeasonStats::Rows),
            ChartLayout::Combined | ChartLayout::Split => decode_table(&raw).map(SeasonStats::Table),
        };
        decoded.map_err(|e| {
            error!(error = %e, key = %key, "Failed to decode stats CSV");
            DataError::malformed(key, e)
        })
    }

    pub async fn fetch_charts(&self, season: &SeasonId) -> Result<Vec<Chart>, DataError> {
        let layout = self.config.chart_layout;
        let mut charts = Vec::new();

        for name in chart_names(layout) {
            let chart = match layout {
                ChartLayout::Images => {
                    let file = plot_file_name(name, season, "png");
                    Chart::Image {
                        name: name.to_string(),
                        url: self
                            .keys()
                            .public_plot_url(&self.config.region, &self.config.bucket, &file),
                    }
                }
                ChartLayout::Combined | ChartLayout::Split => {
                    let file = plot_file_name(name, season, "json");
                    self.fetch_chart_document(name, &file).await?
                }
            };
            charts.push(chart);
        }
        Ok(charts)
    }

    async fn fetch_chart_document(&self, name: &str, file: &str) -> Result<Chart, DataError> {
        let (key, raw) = if self.config.use_local {
            let path = self.local_plot_path(file);
            let raw = read_local(&path).await?;
            (path.display().to_string(), raw)
        } else {
            let key = self.keys().plot_key(file);
            let raw = self
                .store
                .get_object_string(&self.config.region, &self.config.bucket, &key)
                .await?;
            (key, raw)
        };

        let spec: Value = serde_json::from_str(&raw).map_err(|e| {
            error!(error = %e, key = %key, "Failed to decode chart JSON");
            DataError::malformed(key.clone(), e)
        })?;

        Ok(Chart::Document {
            name: name.to_string(),
            key,
            spec,
        })
    }

    fn local_plot_path(&self, file: &str) -> PathBuf {
        self.config.local_data_dir.join(crate::keys::PLOTS_DIR).join(file)
    }
}

async fn read_local(path: &std::path::Path) -> Result<String, DataError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        error!(error = %e, path = %path.display(), "Failed to read local chart artifact");
        match e.kind() {
            std::io::ErrorKind::NotFound => DataError::ObjectNotFound {
                region: "local".to_string(),
                bucket: String::new(),
                key: path.display().to_string(),
            },
            std::io::ErrorKind::InvalidData => DataError::malformed(path.display().to_string(), e),
            _ => DataError::StoreUnavailable {
                region: "local".to_string(),
                bucket: String::new(),
                message: format!("{}: {e}", path.display()),
            },
        }
    })
}
