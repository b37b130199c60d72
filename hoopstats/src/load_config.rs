/// `load_config` module: builds the single [`SiteConfig`] the data layer runs with.
///
/// Sources, lowest precedence first:
/// 1. built-in defaults (see `hoopstats_core::config`)
/// 2. an optional YAML file
/// 3. environment variables (a `.env` file is loaded by `main`)
///
/// Secrets only ever come from the environment (`AccessKeyId`,
/// `SecretAccessKey`); the YAML file holds locations and switches.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use hoopstats_core::config::{ChartLayout, SiteConfig, StaticCredentials};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const ENV_ACCESS_KEY_ID: &str = "AccessKeyId";
pub const ENV_SECRET_ACCESS_KEY: &str = "SecretAccessKey";
pub const ENV_USE_LOCAL: &str = "USE_LOCAL";
pub const ENV_REGION: &str = "HOOPSTATS_REGION";
pub const ENV_BUCKET: &str = "HOOPSTATS_BUCKET";
pub const ENV_ROOT_KEY: &str = "HOOPSTATS_ROOT_KEY";
pub const ENV_ENDPOINT: &str = "HOOPSTATS_ENDPOINT";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub charts: ChartsSection,
    #[serde(default)]
    pub stats: StatsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub root_key: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartsSection {
    pub layout: Option<ChartLayout>,
    pub use_local: Option<bool>,
    pub local_data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatsSection {
    /// Trailing auxiliary columns to drop from positional stats tables.
    pub drop_trailing: Option<usize>,
}

/// Read and parse a YAML config file.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid "all defaults" config.
    if config_content.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Merge defaults, the optional file and the environment into a [`SiteConfig`].
pub fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    let file = match path {
        Some(p) => read_config_file(p)?,
        None => FileConfig::default(),
    };

    let mut config = SiteConfig::default();

    if let Some(region) = file.store.region {
        config.region = region;
    }
    if let Some(bucket) = file.store.bucket {
        config.bucket = bucket;
    }
    if let Some(root_key) = file.store.root_key {
        config.root_key = root_key;
    }
    config.endpoint = file.store.endpoint;
    if let Some(layout) = file.charts.layout {
        config.chart_layout = layout;
    }
    if let Some(use_local) = file.charts.use_local {
        config.use_local = use_local;
    }
    if let Some(dir) = file.charts.local_data_dir {
        config.local_data_dir = dir;
    }
    if let Some(drop_trailing) = file.stats.drop_trailing {
        config.stats_drop_trailing = drop_trailing;
    }

    if let Some(region) = env_var(ENV_REGION) {
        config.region = region;
    }
    if let Some(bucket) = env_var(ENV_BUCKET) {
        config.bucket = bucket;
    }
    if let Some(root_key) = env_var(ENV_ROOT_KEY) {
        config.root_key = root_key;
    }
    if let Some(endpoint) = env_var(ENV_ENDPOINT) {
        config.endpoint = Some(endpoint);
    }
    // Any non-empty value switches local chart reads on.
    if env_var(ENV_USE_LOCAL).is_some() {
        config.use_local = true;
    }

    config.credentials = match (env_var(ENV_ACCESS_KEY_ID), env_var(ENV_SECRET_ACCESS_KEY)) {
        (Some(access_key_id), Some(secret_access_key)) => {
            info!("{ENV_ACCESS_KEY_ID}/{ENV_SECRET_ACCESS_KEY} found in env");
            Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            })
        }
        (Some(_), None) | (None, Some(_)) => {
            error!("Only one of {ENV_ACCESS_KEY_ID}/{ENV_SECRET_ACCESS_KEY} is set");
            anyhow::bail!(
                "{ENV_ACCESS_KEY_ID} and {ENV_SECRET_ACCESS_KEY} must be set together"
            );
        }
        (None, None) => {
            info!("No static credentials in env, using the ambient credential chain");
            None
        }
    };

    config.trace_loaded();
    Ok(config)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
