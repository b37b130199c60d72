//! Object store client: paginated listing and whole-object reads.
//!
//! [`ObjectStoreClient`] drives pagination over any [`StoreBackend`].
//! [`S3Backend`] is the production backend; it owns a [`ClientPool`] with one
//! lazily created handle per region.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tracing::{debug, error, info};

use crate::config::{SiteConfig, StaticCredentials};
use crate::contract::{KeyPage, StoreBackend};
use crate::error::DataError;

pub struct ObjectStoreClient<B> {
    backend: B,
}

impl<B: StoreBackend> ObjectStoreClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// List every key under `prefix`, following continuation cursors until the
    /// store reports the last page. Keys keep the store's order.
    ///
    /// Any failing page fails the whole call; partial listings are never
    /// returned.
    pub async fn list_keys(
        &self,
        region: &str,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, DataError> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .backend
                .list_page(region, bucket, prefix, cursor.take())
                .await
                .map_err(|e| {
                    error!(error = %e, region, bucket, prefix, pages, "Listing page failed");
                    e
                })?;
            pages += 1;
            debug!(page = pages, count = page.keys.len(), prefix, "Fetched listing page");
            keys.extend(page.keys);

            if !page.is_truncated {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    error!(region, bucket, prefix, pages, "Truncated listing page without a cursor");
                    return Err(DataError::StoreUnavailable {
                        region: region.to_string(),
                        bucket: bucket.to_string(),
                        message: format!(
                            "listing of {prefix} truncated after page {pages} without a continuation cursor"
                        ),
                    });
                }
            }
        }

        info!(region, bucket, prefix, pages, keys = keys.len(), "Listed keys");
        Ok(keys)
    }

    pub async fn get_object_bytes(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, DataError> {
        let bytes = self.backend.get_object(region, bucket, key).await.map_err(|e| {
            error!(error = %e, region, bucket, key, "Fetching object failed");
            e
        })?;
        debug!(key, size = bytes.len(), "Fetched object");
        Ok(bytes)
    }

    pub async fn get_object_string(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
    ) -> Result<String, DataError> {
        let bytes = self.get_object_bytes(region, bucket, key).await?;
        String::from_utf8(bytes).map_err(|e| {
            error!(error = %e, key, "Object is not valid UTF-8");
            DataError::malformed(key, e)
        })
    }
}

impl ObjectStoreClient<S3Backend> {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(S3Backend::new(ClientPool::from_config(config)))
    }
}

/// Everything needed to talk to one region; credentials are resolved once,
/// when the handle is created.
pub struct RegionHandle {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl RegionHandle {
    fn bucket(&self, name: &str) -> Result<Bucket, S3Error> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())?;
        Ok(if self.path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }
}

/// Per-region handle cache with get-or-create semantics. Handles are never
/// evicted; the pool lives as long as its owner. Two callers racing on a new
/// region may both build a handle; the first one stored wins.
pub struct ClientPool {
    endpoint: Option<String>,
    credentials: Option<StaticCredentials>,
    handles: Mutex<HashMap<String, Arc<RegionHandle>>>,
}

impl ClientPool {
    pub fn new(endpoint: Option<String>, credentials: Option<StaticCredentials>) -> Self {
        Self {
            endpoint,
            credentials,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.endpoint.clone(), config.credentials.clone())
    }

    pub fn get_or_create(&self, region: &str) -> Result<Arc<RegionHandle>, DataError> {
        if let Some(handle) = self.handles().get(region).cloned() {
            return Ok(handle);
        }

        // Credential resolution may block; the lock is not held here.
        let created = Arc::new(self.create(region)?);
        let handle = Arc::clone(
            self.handles()
                .entry(region.to_string())
                .or_insert_with(|| Arc::clone(&created)),
        );
        if Arc::ptr_eq(&handle, &created) {
            info!(region, custom_endpoint = self.endpoint.is_some(), "Created store client for region");
        }
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.handles().len()
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<String, Arc<RegionHandle>>> {
        self.handles.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn create(&self, region: &str) -> Result<RegionHandle, DataError> {
        let unavailable = |message: String| DataError::StoreUnavailable {
            region: region.to_string(),
            bucket: String::new(),
            message,
        };

        let resolved_region = match &self.endpoint {
            Some(endpoint) => Region::Custom {
                region: region.to_string(),
                endpoint: endpoint.clone(),
            },
            None => region
                .parse::<Region>()
                .map_err(|e| unavailable(format!("invalid region: {e}")))?,
        };

        let credentials = match &self.credentials {
            Some(c) => Credentials::new(
                Some(&c.access_key_id),
                Some(&c.secret_access_key),
                None,
                None,
                None,
            ),
            None => Credentials::new(None, None, None, None, None),
        }
        .map_err(|e| {
            error!(error = %e, region, "Failed to resolve store credentials");
            unavailable(format!("credentials: {e}"))
        })?;

        Ok(RegionHandle {
            region: resolved_region,
            credentials,
            path_style: self.endpoint.is_some(),
        })
    }
}

pub struct S3Backend {
    pool: ClientPool,
}

impl S3Backend {
    pub fn new(pool: ClientPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ClientPool {
        &self.pool
    }

    fn bucket(&self, region: &str, bucket: &str) -> Result<Bucket, DataError> {
        let handle = self.pool.get_or_create(region)?;
        handle
            .bucket(bucket)
            .map_err(|e| classify_s3_error(e, region, bucket, None))
    }
}

#[async_trait]
impl StoreBackend for S3Backend {
    async fn list_page(
        &self,
        region: &str,
        bucket: &str,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<KeyPage, DataError> {
        let handle = self.bucket(region, bucket)?;
        let (result, _status) = handle
            .list_page(prefix.to_string(), None, cursor, None, None)
            .await
            .map_err(|e| classify_s3_error(e, region, bucket, None))?;

        Ok(KeyPage {
            keys: result.contents.into_iter().map(|object| object.key).collect(),
            next_cursor: result.next_continuation_token,
            is_truncated: result.is_truncated,
        })
    }

    async fn get_object(
        &self,
        region: &str,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, DataError> {
        let handle = self.bucket(region, bucket)?;
        let response = handle
            .get_object(key)
            .await
            .map_err(|e| classify_s3_error(e, region, bucket, Some(key)))?;
        Ok(response.bytes().to_vec())
    }
}

/// Map an S3 failure onto the data-layer taxonomy. A 404 on an object read is
/// the only thing that counts as "not found"; a 404 while listing means the
/// bucket itself is missing, which is a store problem.
pub fn classify_s3_error(err: S3Error, region: &str, bucket: &str, key: Option<&str>) -> DataError {
    match (&err, key) {
        (S3Error::HttpFailWithBody(404, _), Some(key)) => DataError::ObjectNotFound {
            region: region.to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => DataError::StoreUnavailable {
            region: region.to_string(),
            bucket: bucket.to_string(),
            message: err.to_string(),
        },
    }
}
