//! "Last updated" label derived from `<root>/latest.yaml`.

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_yaml::Value;
use tracing::{error, info};

use crate::config::SiteConfig;
use crate::contract::StoreBackend;
use crate::error::DataError;
use crate::keys::ArtifactKeys;
use crate::store::ObjectStoreClient;

/// What the pipeline records about its last publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateMetadata {
    pub git_sha: Option<String>,
    /// Unix seconds.
    pub time: i64,
}

pub fn parse_update_metadata(key: &str, raw: &str) -> Result<UpdateMetadata, DataError> {
    let doc: Value = serde_yaml::from_str(raw).map_err(|e| DataError::malformed(key, e))?;

    let time = match doc.get("time") {
        None | Some(Value::Null) => {
            return Err(DataError::malformed(key, "missing `time` field"));
        }
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
            .ok_or_else(|| DataError::malformed(key, format!("`time` is not numeric: {v:?}")))?,
    };

    let git_sha = doc.get("git_sha").and_then(Value::as_str).map(str::to_string);

    Ok(UpdateMetadata { git_sha, time })
}

/// `YYYY-MM-DD` of `timestamp` in `tz`. `None` if the timestamp is out of
/// range for the calendar.
pub fn format_update_date<Tz>(timestamp: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    tz.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

pub struct UpdateReader<'a, B> {
    config: &'a SiteConfig,
    store: &'a ObjectStoreClient<B>,
}

impl<'a, B: StoreBackend> UpdateReader<'a, B> {
    pub fn new(config: &'a SiteConfig, store: &'a ObjectStoreClient<B>) -> Self {
        Self { config, store }
    }

    pub async fn get_update_metadata(&self) -> Result<UpdateMetadata, DataError> {
        let key = ArtifactKeys::new(&self.config.root_key).latest_key();
        let raw = self
            .store
            .get_object_string(&self.config.region, &self.config.bucket, &key)
            .await?;
        let meta = parse_update_metadata(&key, &raw).map_err(|e| {
            error!(error = %e, key = %key, "Failed to decode update metadata");
            e
        })?;
        info!(key = %key, time = meta.time, git_sha = meta.git_sha.as_deref().unwrap_or("-"), "Loaded update metadata");
        Ok(meta)
    }

    /// Update date in the local time zone.
    pub async fn get_update_date(&self) -> Result<String, DataError> {
        let key = ArtifactKeys::new(&self.config.root_key).latest_key();
        let meta = self.get_update_metadata().await?;
        format_update_date(meta.time, &Local)
            .ok_or_else(|| DataError::malformed(key, format!("`time` out of range: {}", meta.time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_update_date(1_700_000_000, &Utc).as_deref(), Some("2023-11-14"));
        // 2024-03-01T00:00:00Z
        assert_eq!(format_update_date(1_709_251_200, &Utc).as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn parses_sha_and_time() {
        let meta = parse_update_metadata("prod/latest.yaml", "git_sha: abc123\ntime: 1700000000\n").unwrap();
        assert_eq!(
            meta,
            UpdateMetadata {
                git_sha: Some("abc123".into()),
                time: 1_700_000_000,
            }
        );
    }

    #[test]
    fn fractional_time_is_truncated_to_seconds() {
        let meta = parse_update_metadata("k", "time: 1700000000.75\n").unwrap();
        assert_eq!(meta.time, 1_700_000_000);
        assert_eq!(meta.git_sha, None);
    }

    #[test]
    fn missing_time_is_malformed() {
        let err = parse_update_metadata("prod/latest.yaml", "git_sha: abc123\n").unwrap_err();
        match err {
            DataError::MalformedArtifact { key, reason } => {
                assert_eq!(key, "prod/latest.yaml");
                assert!(reason.contains("time"), "{reason}");
            }
            other => panic!("expected MalformedArtifact, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_time_is_malformed() {
        let err = parse_update_metadata("k", "time: yesterday\n").unwrap_err();
        assert!(matches!(err, DataError::MalformedArtifact { .. }));
    }

    #[test]
    fn invalid_yaml_is_malformed() {
        let err = parse_update_metadata("k", "time: [:::").unwrap_err();
        assert!(matches!(err, DataError::MalformedArtifact { .. }));
    }
}
