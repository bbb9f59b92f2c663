//! Error types for each stage of the ingestion pipeline.
//!
//! Every stage gets its own enum so callers can decide which failures are
//! fatal. The pipeline only propagates [`StoreError`] from the upsert writer.
//! Everything else is logged at the call site and the run continues.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading the search config or resolving credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing Supabase credentials")]
    MissingCredentials,
}

/// Failure of a single scrape call.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid scraper URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("scraper returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Failure talking to the hosted datastore.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to encode rows: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of the retention sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("no crawl date lies {days} days before {today}")]
    CutoffOutOfRange { today: NaiveDate, days: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A scraped row that cannot become a [`crate::models::Listing`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("row has no job_url")]
    MissingJobUrl,
}
