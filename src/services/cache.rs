use crate::core::collection::{CollectionError, ReferenceCollection, Snapshot};
use std::sync::Arc;
use std::time::Duration;

const SNAPSHOT_KEY: &str = "reference:snapshot";

/// TTL cache in front of a reference collection
///
/// Concurrent searches within one TTL window share a single enumeration of
/// the inner collection. Failed enumerations are not cached. A TTL of zero
/// disables caching and every call goes straight to the inner collection.
pub struct CachedCollection<C> {
    inner: C,
    snapshots: Option<moka::future::Cache<&'static str, Snapshot>>,
}

impl<C: ReferenceCollection> CachedCollection<C> {
    pub fn new(inner: C, ttl_secs: u64) -> Self {
        let snapshots = (ttl_secs > 0).then(|| {
            moka::future::CacheBuilder::new(1)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build()
        });

        Self { inner, snapshots }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Drop the cached snapshot so the next call re-reads the inner collection
    pub async fn invalidate(&self) {
        if let Some(snapshots) = &self.snapshots {
            snapshots.invalidate(SNAPSHOT_KEY).await;
            tracing::debug!("Invalidated reference snapshot");
        }
    }
}

impl<C: ReferenceCollection> ReferenceCollection for CachedCollection<C> {
    async fn records(&self) -> Result<Snapshot, CollectionError> {
        let Some(snapshots) = &self.snapshots else {
            return self.inner.records().await;
        };

        snapshots
            .try_get_with(SNAPSHOT_KEY, async {
                tracing::trace!("Reference snapshot miss, enumerating backend");
                self.inner.records().await
            })
            .await
            .map_err(|e: Arc<CollectionError>| CollectionError::Backend(e.to_string()))
    }
}
