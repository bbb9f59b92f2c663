//! Command-line interface definitions for both binaries.
//!
//! Service endpoints and keys can be given as flags or environment variables.
//! Datastore credentials are not flags. They are resolved by
//! [`crate::config::Credentials::resolve`].

use crate::outputs::retention::DEFAULT_RETENTION_DAYS;
use crate::outputs::upsert::DEFAULT_BATCH_SIZE;
use crate::pipeline::IngestSettings;
use crate::scrapers::ScrapeSettings;
use crate::utils::{DEFAULT_UTC_OFFSET, parse_utc_offset};
use chrono::FixedOffset;
use clap::Parser;
use std::path::PathBuf;

/// Default location of the frontend env file used as a credentials fallback.
pub const DEFAULT_FALLBACK_ENV_FILE: &str = "frontend/.env.local";

/// Upper bound for `--retention-days`, one century.
const MAX_RETENTION_DAYS: i64 = 36_500;

/// Scrape job boards and upsert the listings into Supabase.
///
/// # Examples
///
/// ```sh
/// # Defaults: ./scraper_config.json, JobSpy API on localhost:8000
/// job_board_sync
///
/// # Only LinkedIn, without full descriptions
/// job_board_sync --sites linkedin --skip-descriptions
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the roles/cities JSON config
    #[arg(short, long, default_value = "scraper_config.json")]
    pub config: PathBuf,

    /// Base URL of the JobSpy API service
    #[arg(long, env = "JOBSPY_API_URL", default_value = "http://localhost:8000")]
    pub jobspy_url: String,

    /// API key for the JobSpy API service
    #[arg(long, env = "JOBSPY_API_KEY", hide_env_values = true)]
    pub jobspy_api_key: Option<String>,

    /// Job boards to search
    #[arg(long, value_delimiter = ',', default_values = ["indeed", "linkedin", "google"])]
    pub sites: Vec<String>,

    /// Maximum results per site for each search
    #[arg(long, default_value_t = 50)]
    pub results_wanted: u32,

    /// Only listings posted within this many hours
    #[arg(long, default_value_t = 24)]
    pub hours_old: u32,

    /// Country filter for Indeed and Glassdoor
    #[arg(long, default_value = "INDIA")]
    pub country_indeed: String,

    /// Do not fetch full LinkedIn descriptions
    #[arg(long)]
    pub skip_descriptions: bool,

    /// Listings per upsert request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    pub batch_size: usize,

    /// Crawl dates older than this many days are deleted
    #[arg(
        long,
        default_value_t = DEFAULT_RETENTION_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=MAX_RETENTION_DAYS)
    )]
    pub retention_days: u32,

    /// UTC offset of the calendar used for crawl dates
    #[arg(
        long,
        default_value = DEFAULT_UTC_OFFSET,
        value_parser = parse_utc_offset,
        allow_hyphen_values = true
    )]
    pub utc_offset: FixedOffset,

    /// Env file consulted when SUPABASE_URL / SUPABASE_KEY are unset
    #[arg(long, default_value = DEFAULT_FALLBACK_ENV_FILE)]
    pub fallback_env_file: PathBuf,
}

impl Cli {
    pub fn ingest_settings(&self) -> IngestSettings {
        IngestSettings {
            scrape: ScrapeSettings {
                sites: self.sites.clone(),
                results_wanted: self.results_wanted,
                hours_old: self.hours_old,
                country_indeed: self.country_indeed.clone(),
                fetch_descriptions: !self.skip_descriptions,
            },
            batch_size: self.batch_size,
            retention_days: self.retention_days,
            ..IngestSettings::default()
        }
    }
}

/// Print every row of the Supabase feedback table.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct FeedbackCli {
    /// Env file consulted when SUPABASE_URL / SUPABASE_KEY are unset
    #[arg(long, default_value = DEFAULT_FALLBACK_ENV_FILE)]
    pub fallback_env_file: PathBuf,
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
