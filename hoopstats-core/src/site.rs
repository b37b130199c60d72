//! Page-level orchestration: what each page of the site needs, assembled from
//! the indexer, the season assembler and the update reader.
//!
//! # Pages
//! - Home: the league index (for the menu) and the update date.
//! - Season (`/<league>/<year>`): the season record, the index and the
//!   update date. A league/year that is not in the index is reported as
//!   `Ok(None)` so the caller can render its not-found state.
//!
//! # Concurrency
//! Independent fetches for one page run concurrently on the current task
//! (`tokio::try_join!`); the first failure fails the page.
//!
//! # Error Handling
//! Store and decode failures come back as [`DataError`] unchanged. Callers
//! should log them and show a generic error rather than the detail.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::contract::StoreBackend;
use crate::error::DataError;
use crate::index::{build_league_index, parse_stats_key, LeagueIndex};
use crate::keys::{ArtifactKeys, SeasonId, DEFAULT_SEASON_TYPE};
use crate::season::{SeasonAssembler, SeasonRecord};
use crate::store::{ObjectStoreClient, S3Backend};
use crate::updated::UpdateReader;

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub leagues: LeagueIndex,
    pub update_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonPage {
    pub title: String,
    pub season: SeasonRecord,
    pub leagues: LeagueIndex,
    pub update_date: String,
}

/// `NBA 2022 Regular Season`
pub fn season_title(season: &SeasonId) -> String {
    format!(
        "{} {} {}",
        season.league.to_uppercase(),
        season.year,
        season.season_type
    )
}

pub struct SiteData<B> {
    config: SiteConfig,
    store: ObjectStoreClient<B>,
}

impl SiteData<S3Backend> {
    pub fn from_config(config: SiteConfig) -> Self {
        let store = ObjectStoreClient::from_config(&config);
        Self::new(config, store)
    }
}

impl<B: StoreBackend> SiteData<B> {
    pub fn new(config: SiteConfig, store: ObjectStoreClient<B>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn store(&self) -> &ObjectStoreClient<B> {
        &self.store
    }

    async fn list_stats_keys(&self) -> Result<Vec<String>, DataError> {
        let prefix = ArtifactKeys::new(&self.config.root_key).teams_prefix();
        self.store
            .list_keys(&self.config.region, &self.config.bucket, &prefix)
            .await
    }

    /// List the stats folder and index it. Built fresh on every call.
    pub async fn league_index(&self) -> Result<LeagueIndex, DataError> {
        let keys = self.list_stats_keys().await?;
        let index = build_league_index(&keys);
        info!(keys = keys.len(), leagues = index.len(), "Built league index");
        Ok(index)
    }

    pub async fn update_date(&self) -> Result<String, DataError> {
        UpdateReader::new(&self.config, &self.store).get_update_date().await
    }

    pub async fn season_data(&self, season: &SeasonId) -> Result<SeasonRecord, DataError> {
        SeasonAssembler::new(&self.config, &self.store)
            .get_season_data(season)
            .await
    }

    pub async fn home_page(&self) -> Result<HomePage, DataError> {
        let (leagues, update_date) = tokio::try_join!(self.league_index(), self.update_date())?;
        Ok(HomePage {
            leagues,
            update_date,
        })
    }

    /// Season page for a regular season, `Ok(None)` when the pair is unknown.
    pub async fn season_page(
        &self,
        league: &str,
        year: &str,
    ) -> Result<Option<SeasonPage>, DataError> {
        self.season_page_for(&SeasonId::new(league, year, DEFAULT_SEASON_TYPE))
            .await
    }

    /// `Ok(None)` unless a stats artifact for exactly this league, year and
    /// season type is listed.
    pub async fn season_page_for(&self, season: &SeasonId) -> Result<Option<SeasonPage>, DataError> {
        let keys = self.list_stats_keys().await?;
        let listed = keys
            .iter()
            .filter_map(|key| parse_stats_key(key))
            .any(|candidate| candidate == *season);
        if !listed {
            warn!(
                league = %season.league,
                year = %season.year,
                season_type = %season.season_type,
                "Season not in index"
            );
            return Ok(None);
        }
        let leagues = build_league_index(&keys);

        let (update_date, record) =
            tokio::try_join!(self.update_date(), self.season_data(season))?;

        Ok(Some(SeasonPage {
            title: season_title(season),
            season: record,
            leagues,
            update_date,
        }))
    }

    /// `<league>/<year>` for every season page that can be pre-rendered.
    pub async fn season_paths(&self) -> Result<Vec<String>, DataError> {
        let index = self.league_index().await?;
        Ok(index
            .season_paths()
            .into_iter()
            .map(|(league, year)| format!("{league}/{year}"))
            .collect())
    }
}
