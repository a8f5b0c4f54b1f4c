//! Bounding-box and limit queries over the cached stop list.

use serde::Deserialize;

use super::cache::{StopCache, StopLoader};
use super::error::StopsError;
use super::parse::Stop;
use super::source::FeedSource;

/// Default number of stops returned.
pub const DEFAULT_LIMIT: i64 = 5000;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Filter parameters for a stop query.
///
/// Each bound is optional and inclusive. When at least one is given, a stop
/// must satisfy all of the given bounds.
///
/// **`limit <= 0` means "no limit", not "no results".** A positive limit
/// keeps the first `limit` matches in feed order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopQuery {
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub max_lon: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for StopQuery {
    fn default() -> Self {
        Self {
            min_lat: None,
            max_lat: None,
            min_lon: None,
            max_lon: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl StopQuery {
    /// Whether any bound is set.
    pub fn has_bounds(&self) -> bool {
        self.min_lat.is_some()
            || self.max_lat.is_some()
            || self.min_lon.is_some()
            || self.max_lon.is_some()
    }

    /// Whether `stop` lies within every given bound.
    pub fn contains(&self, stop: &Stop) -> bool {
        self.min_lat.is_none_or(|min| stop.lat >= min)
            && self.max_lat.is_none_or(|max| stop.lat <= max)
            && self.min_lon.is_none_or(|min| stop.lon >= min)
            && self.max_lon.is_none_or(|max| stop.lon <= max)
    }

    /// Apply the bounds and limit to `stops`, preserving order.
    pub fn apply(&self, stops: &[Stop]) -> Vec<Stop> {
        let take = match usize::try_from(self.limit) {
            Ok(n) if n > 0 => n,
            _ => usize::MAX,
        };

        if !self.has_bounds() {
            return stops.iter().take(take).cloned().collect();
        }

        stops
            .iter()
            .filter(|s| self.contains(s))
            .take(take)
            .cloned()
            .collect()
    }
}

/// Serves stop queries from a lazily-loaded cache.
///
/// The service is the sole owner of its cache; nothing else can mutate it.
pub struct StopService<L = FeedSource> {
    cache: StopCache<L>,
}

impl<L: StopLoader> StopService<L> {
    /// Create a service that loads stops through `loader` on first query.
    pub fn new(loader: L) -> Self {
        Self {
            cache: StopCache::new(loader),
        }
    }

    /// Return the stops matching `query`, loading the feed if needed.
    pub async fn query(&self, query: &StopQuery) -> Result<Vec<Stop>, StopsError> {
        let stops = self.cache.get_stops().await?;
        Ok(query.apply(&stops))
    }
}
