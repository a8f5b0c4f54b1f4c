//! GTFS stop loading, caching and querying.
//!
//! Stops come from a local `stops.txt` when one exists, otherwise from the
//! `stops.txt` member of a remote GTFS zip. The parsed list is cached for
//! the life of the process; a failed load leaves the cache empty so the
//! next query tries again.

mod cache;
mod error;
mod parse;
mod query;
mod source;

pub use cache::{StopCache, StopList, StopLoader};
pub use error::{FeedError, StopsError};
pub use parse::{Stop, parse_stops};
pub use query::{DEFAULT_LIMIT, StopQuery, StopService};
pub use source::{FeedConfig, FeedSource, parse_archive};
