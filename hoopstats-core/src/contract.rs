//! # contract: the seam between the data layer and the blob store
//!
//! [`StoreBackend`] is the one trait the rest of the crate talks to when it
//! needs bytes from the object store. It exposes a single listing *page*;
//! pagination is driven by [`crate::store::ObjectStoreClient`].
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockStoreBackend` is exported when
//!   the `test-export-mocks` feature is on (the default), so integration tests
//!   and downstream crates can script store behaviour.
//!
//! ## Implementations
//! - [`crate::store::S3Backend`]: AWS S3 or any S3-compatible endpoint.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::DataError;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    /// Keys in the order the store returned them.
    pub keys: Vec<String>,
    /// Cursor for the next page; `None` when the store reports no more pages.
    pub next_cursor: Option<String>,
    /// Whether the store says the listing continues past this page.
    pub is_truncated: bool,
}

impl KeyPage {
    pub fn last(keys: Vec<String>) -> Self {
        KeyPage {
            keys,
            next_cursor: None,
            is_truncated: false,
        }
    }

    pub fn truncated(keys: Vec<String>, cursor: impl Into<String>) -> Self {
        KeyPage {
            keys,
            next_cursor: Some(cursor.into()),
            is_truncated: true,
        }
    }
}

/// Raw access to a region/bucket/key addressed blob store.
///
/// Implementors map their transport errors onto [`DataError`]: a missing key
/// is `ObjectNotFound`, everything else that goes wrong on the wire is
/// `StoreUnavailable`. No retries belong here.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Fetch a single listing page for `prefix`, starting at `cursor`.
    async fn list_page(
        &self,
        region: &str,
        bucket: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<KeyPage, DataError>;

    /// Fetch a whole object into memory.
    async fn get_object(&self, region: &str, bucket: &str, key: &str)
        -> Result<Vec<u8>, DataError>;
}
