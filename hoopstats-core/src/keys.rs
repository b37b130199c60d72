//! Artifact key naming.
//!
//! These strings must stay bit-exact with what the analysis pipeline writes.

use serde::Serialize;

pub const DEFAULT_SEASON_TYPE: &str = "Regular Season";

pub const TEAMS_DIR: &str = "teams";
pub const PLOTS_DIR: &str = "plots";
pub const LATEST_FILE: &str = "latest.yaml";

/// Identifies one season's worth of artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SeasonId {
    pub league: String,
    pub year: String,
    pub season_type: String,
}

impl SeasonId {
    pub fn new(
        league: impl Into<String>,
        year: impl Into<String>,
        season_type: impl Into<String>,
    ) -> Self {
        SeasonId {
            league: league.into(),
            year: year.into(),
            season_type: season_type.into(),
        }
    }

    pub fn regular_season(league: impl Into<String>, year: impl Into<String>) -> Self {
        Self::new(league, year, DEFAULT_SEASON_TYPE)
    }

    /// `<league>_<year>_<seasonType>`, shared by every artifact name.
    pub fn stem(&self) -> String {
        format!("{}_{}_{}", self.league, self.year, self.season_type)
    }
}

/// Key builder bound to one root prefix.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactKeys<'a> {
    root: &'a str,
}

impl<'a> ArtifactKeys<'a> {
    pub fn new(root: &'a str) -> Self {
        ArtifactKeys {
            root: root.trim_end_matches('/'),
        }
    }

    /// Listing prefix used to discover leagues and years.
    pub fn teams_prefix(&self) -> String {
        format!("{}/{TEAMS_DIR}/", self.root)
    }

    pub fn stats_key(&self, season: &SeasonId) -> String {
        format!("{}/{TEAMS_DIR}/{}_teams.csv", self.root, season.stem())
    }

    pub fn plot_key(&self, file_name: &str) -> String {
        format!("{}/{PLOTS_DIR}/{file_name}", self.root)
    }

    pub fn latest_key(&self) -> String {
        format!("{}/{LATEST_FILE}", self.root)
    }

    /// Public URL of a plot image served straight from the bucket.
    pub fn public_plot_url(&self, region: &str, bucket: &str, file_name: &str) -> String {
        format!(
            "https://{bucket}.s3-{region}.amazonaws.com/{}",
            self.plot_key(file_name)
        )
    }
}

/// `team_<chart>_<league>_<year>_<seasonType>.<extension>`
pub fn plot_file_name(chart: &str, season: &SeasonId, extension: &str) -> String {
    format!("team_{chart}_{}.{extension}", season.stem())
}
