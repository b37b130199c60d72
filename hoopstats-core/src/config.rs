use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_BUCKET: &str = "nba-mattefay";
pub const DEFAULT_ROOT_KEY: &str = "prod";
pub const DEFAULT_LOCAL_DATA_DIR: &str = "../data";

/// Everything the data layer needs to know about where artifacts live.
///
/// Built once at process start (see the CLI crate's `load_config`) and passed
/// by reference into every component; nothing in the core reads the
/// environment on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub region: String,
    pub bucket: String,
    /// Deployment partition every key lives under, e.g. `prod`.
    pub root_key: String,
    /// Custom S3-compatible endpoint (MinIO, LocalStack). `None` means AWS.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub credentials: Option<StaticCredentials>,
    #[serde(default)]
    pub chart_layout: ChartLayout,
    /// Read chart artifacts from `local_data_dir` instead of the store.
    #[serde(default)]
    pub use_local: bool,
    pub local_data_dir: PathBuf,
    /// Auxiliary trailing columns dropped from positional stats tables.
    #[serde(default)]
    pub stats_drop_trailing: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            region: DEFAULT_REGION.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            root_key: DEFAULT_ROOT_KEY.to_string(),
            endpoint: None,
            credentials: None,
            chart_layout: ChartLayout::default(),
            use_local: false,
            local_data_dir: PathBuf::from(DEFAULT_LOCAL_DATA_DIR),
            stats_drop_trailing: 0,
        }
    }
}

impl SiteConfig {
    pub fn trace_loaded(&self) {
        info!(
            region = %self.region,
            bucket = %self.bucket,
            root_key = %self.root_key,
            endpoint = self.endpoint.as_deref().unwrap_or("aws"),
            chart_layout = ?self.chart_layout,
            use_local = self.use_local,
            stats_drop_trailing = self.stats_drop_trailing,
            static_credentials = self.credentials.is_some(),
            "Loaded SiteConfig"
        );
        debug!(local_data_dir = %self.local_data_dir.display(), "SiteConfig local data dir");
    }
}

/// Explicit access key pair. When absent, the ambient credential chain is
/// used (environment, profile, instance role).
#[derive(Clone, Serialize, Deserialize)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Which generation of chart artifacts a deployment publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartLayout {
    /// One `team_stats_*.json` document per season.
    #[default]
    Combined,
    /// Separate `team_ratings_*.json` and `team_paces_*.json` documents.
    Split,
    /// Pre-rendered PNGs referenced by public URL; nothing is fetched. The
    /// stats table of this generation is decoded positionally.
    Images,
}
