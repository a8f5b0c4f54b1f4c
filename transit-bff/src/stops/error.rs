//! Stop feed error types.

use std::sync::Arc;

/// Errors that can occur while loading a GTFS stops feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// No local file and no API key for the remote feed
    #[error("GTFS_SWEDEN3_STATIC_KEY is not set; cannot download GTFS")]
    MissingCredential,

    /// Header lacks one or more required columns
    #[error("GTFS stops file missing required columns: {}", .missing.join(", "))]
    MalformedFeed { missing: Vec<&'static str> },

    /// Downloaded archive has no `stops.txt`
    #[error("{member} not found inside GTFS zip")]
    MissingArchiveMember { member: &'static str },

    /// Transport failure talking to the feed host
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// Feed host answered with a non-2xx status
    #[error("feed download failed with status {status}")]
    Status { status: u16 },

    /// Reading the local file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The downloaded body is not a readable zip archive
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The header row could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Load finished but produced no stops
    #[error("No stops loaded from GTFS stops source")]
    EmptyFeed,

    /// The background load task panicked or was aborted
    #[error("feed load task failed: {message}")]
    Task { message: String },
}

/// Errors surfaced by the stop query service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StopsError {
    /// The stop list could not be loaded; the cache stays empty.
    #[error("{0}")]
    FeedUnavailable(Arc<FeedError>),
}

impl StopsError {
    /// The underlying load failure.
    pub fn cause(&self) -> &FeedError {
        match self {
            StopsError::FeedUnavailable(e) => e,
        }
    }
}
