//! Process-lifetime cache for the stop list.
//!
//! The cache holds a single entry: the full stop list. It is filled on
//! first use and never expires. Concurrent first callers share one load
//! (moka coalesces `try_get_with` calls for the same key), and a failed
//! load is not cached, so the next caller starts a fresh attempt.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tracing::error;

use super::error::{FeedError, StopsError};
use super::parse::Stop;
use super::source::FeedSource;

/// Cached stop list.
pub type StopList = Arc<Vec<Stop>>;

/// Something that can produce the full stop list.
pub trait StopLoader: Send + Sync + 'static {
    /// Load every stop from the underlying source.
    fn load(&self) -> impl Future<Output = Result<Vec<Stop>, FeedError>> + Send;
}

impl StopLoader for FeedSource {
    fn load(&self) -> impl Future<Output = Result<Vec<Stop>, FeedError>> + Send {
        self.fetch()
    }
}

/// Lazily-populated cache of the stop list.
pub struct StopCache<L = FeedSource> {
    loader: Arc<L>,
    stops: MokaCache<(), StopList>,
}

impl<L: StopLoader> StopCache<L> {
    /// Create an empty cache backed by `loader`.
    pub fn new(loader: L) -> Self {
        Self {
            loader: Arc::new(loader),
            stops: MokaCache::builder().initial_capacity(1).build(),
        }
    }

    /// Get the stop list, loading it on first call.
    ///
    /// The load and the cache insert run together on their own task, so the
    /// cache is filled even if the caller goes away mid-download.
    pub async fn get_stops(&self) -> Result<StopList, StopsError> {
        if let Some(stops) = self.stops.get(&()).await {
            return Ok(stops);
        }

        let loader = Arc::clone(&self.loader);
        let cache = self.stops.clone();

        let filled = tokio::spawn(async move {
            cache
                .try_get_with((), async move {
                    let stops = loader.load().await?;
                    if stops.is_empty() {
                        return Err(FeedError::EmptyFeed);
                    }
                    Ok(Arc::new(stops))
                })
                .await
        })
        .await;

        let result = match filled {
            Ok(result) => result,
            Err(e) => Err(Arc::new(FeedError::Task {
                message: e.to_string(),
            })),
        };

        result.map_err(|e| {
            error!(error = %e, "Failed to load GTFS stops");
            StopsError::FeedUnavailable(e)
        })
    }

    /// Whether the stop list has been loaded.
    #[cfg(test)]
    pub(crate) async fn is_populated(&self) -> bool {
        self.stops.get(&()).await.is_some()
    }
}
