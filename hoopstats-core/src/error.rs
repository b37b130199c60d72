//! Error taxonomy for the data layer.
//!
//! Every failure propagates to the caller unchanged in kind; nothing in this
//! crate retries or recovers locally. The presentation boundary decides how a
//! failure is shown (usually a generic "not found" page).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// The requested key does not exist in the store (or on local disk when
    /// chart artifacts are read locally).
    #[error("object not found: s3://{bucket}/{key} ({region})")]
    ObjectNotFound {
        region: String,
        bucket: String,
        key: String,
    },

    /// Listing or transport failure talking to the store.
    #[error("object store unavailable for s3://{bucket} ({region}): {message}")]
    StoreUnavailable {
        region: String,
        bucket: String,
        message: String,
    },

    /// An artifact was fetched but could not be decoded (CSV, JSON or YAML).
    #[error("malformed artifact {key}: {reason}")]
    MalformedArtifact { key: String, reason: String },
}

impl DataError {
    pub fn malformed(key: impl Into<String>, reason: impl ToString) -> Self {
        DataError::MalformedArtifact {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::ObjectNotFound { .. })
    }
}
