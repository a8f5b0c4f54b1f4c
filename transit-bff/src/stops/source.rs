//! Resolves where stop data comes from: a local file or the remote GTFS zip.

use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use super::error::FeedError;
use super::parse::{Stop, parse_stops};

/// Default local stops file.
const DEFAULT_LOCAL_PATH: &str = "data/stops.txt";

/// Default remote feed (Samtrafiken GTFS Sweden 3).
const DEFAULT_REMOTE_URL: &str = "https://opendata.samtrafiken.se/gtfs/sweden3/latest.zip";

/// Archive member holding the stops table.
const STOPS_MEMBER: &str = "stops.txt";

/// Configuration for the stop feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Local `stops.txt`, preferred when it exists
    pub local_path: PathBuf,
    /// Base URL of the remote GTFS zip
    pub remote_url: String,
    /// API key appended to the remote URL
    pub api_key: String,
    /// Download timeout in seconds
    pub timeout_secs: u64,
}

impl FeedConfig {
    /// Set the local stops file path.
    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_path = path.into();
        self
    }

    /// Set the remote feed base URL.
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    /// Set the remote feed API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the download timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full download URL with the API key as a query parameter.
    pub fn download_url(&self) -> String {
        let separator = if self.remote_url.contains('?') { '&' } else { '?' };
        format!("{}{}key={}", self.remote_url, separator, self.api_key)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            local_path: PathBuf::from(DEFAULT_LOCAL_PATH),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Loads stops from the local file if present, else from the remote archive.
#[derive(Debug, Clone)]
pub struct FeedSource {
    http: reqwest::Client,
    config: FeedConfig,
}

impl FeedSource {
    /// Create a new feed source.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Load and parse every stop in the feed.
    ///
    /// No retry: any failure is returned to the caller as-is.
    pub async fn fetch(&self) -> Result<Vec<Stop>, FeedError> {
        let path = &self.config.local_path;

        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            let data = tokio::fs::read(path).await?;
            let stops = blocking(move || parse_stops(&data)).await?;
            info!(count = stops.len(), path = %path.display(), "Loaded stops from local file");
            return Ok(stops);
        }

        warn!(
            path = %path.display(),
            "GTFS stops file not found; attempting remote download"
        );
        let archive = self.download().await?;
        let stops = blocking(move || parse_archive(&archive)).await?;
        info!(count = stops.len(), "Loaded stops from remote feed");
        Ok(stops)
    }

    /// Download the remote archive into memory.
    async fn download(&self) -> Result<Vec<u8>, FeedError> {
        if self.config.api_key.is_empty() {
            return Err(FeedError::MissingCredential);
        }

        // The key is part of the URL, so only the base is logged.
        info!(url = %self.config.remote_url, "Downloading GTFS feed");
        let response = self.http.get(self.config.download_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Extract and parse `stops.txt` from a zipped GTFS feed.
pub fn parse_archive(archive: &[u8]) -> Result<Vec<Stop>, FeedError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;

    let mut member = match zip.by_name(STOPS_MEMBER) {
        Ok(member) => member,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(FeedError::MissingArchiveMember {
                member: STOPS_MEMBER,
            });
        }
        Err(e) => return Err(e.into()),
    };

    // The declared size comes from the remote archive and is not trusted.
    let mut data = Vec::new();
    member.read_to_end(&mut data)?;

    parse_stops(&data)
}

/// Run CPU-bound feed work off the async workers.
async fn blocking<F>(f: F) -> Result<Vec<Stop>, FeedError>
where
    F: FnOnce() -> Result<Vec<Stop>, FeedError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FeedError::Task {
            message: e.to_string(),
        })?
}
