//! One ingestion run: scrape, normalize, upsert, then sweep.
//!
//! Only an upsert failure ends the run early. Search failures are collected
//! by the scrape driver, and a failed sweep is logged and reported as
//! `deleted: None`.

use crate::config::SearchConfig;
use crate::error::StoreError;
use crate::normalize::normalize;
use crate::outputs::retention::{DEFAULT_RETENTION_DAYS, sweep_expired};
use crate::outputs::upsert::{DEFAULT_BATCH_SIZE, WriteSummary, write_listings};
use crate::outputs::JOBS_TABLE;
use crate::scrapers::{JobScraper, ScrapeSettings, scrape_all};
use crate::store::TableStore;
use chrono::NaiveDate;
use tracing::{error, info, instrument};

/// Knobs for a run beyond the search config itself.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSettings {
    pub scrape: ScrapeSettings,
    pub table: String,
    pub batch_size: usize,
    pub retention_days: u32,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            scrape: ScrapeSettings::default(),
            table: JOBS_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// Counters for one finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub searches: usize,
    pub failed_searches: usize,
    pub scraped_rows: usize,
    pub listings: usize,
    pub duplicates_dropped: usize,
    pub missing_url_dropped: usize,
    pub written: WriteSummary,
    /// Rows removed by the retention sweep, `None` if the sweep failed.
    pub deleted: Option<u64>,
}

/// Run the whole pipeline for `today`, the regional crawl date.
///
/// # Errors
///
/// Only a failed upsert batch is returned as an error.
#[instrument(level = "info", skip_all, fields(%today))]
pub async fn run<Sc, St>(
    config: &SearchConfig,
    scraper: &Sc,
    store: &St,
    settings: &IngestSettings,
    today: NaiveDate,
) -> Result<RunSummary, StoreError>
where
    Sc: JobScraper,
    St: TableStore,
{
    info!(searches = config.combinations(), "Scraping started");
    let report = scrape_all(scraper, config, &settings.scrape).await;
    let mut summary = RunSummary {
        searches: report.attempted,
        failed_searches: report.failures.len(),
        scraped_rows: report.row_count(),
        ..RunSummary::default()
    };

    let normalized = normalize(report.batches, today);
    summary.listings = normalized.listings.len();
    summary.duplicates_dropped = normalized.duplicates_dropped;
    summary.missing_url_dropped = normalized.missing_url_dropped;

    if normalized.listings.is_empty() {
        info!("No listings to write; skipping upsert");
    } else {
        summary.written = write_listings(
            store,
            &settings.table,
            &normalized.listings,
            settings.batch_size,
        )
        .await?;
    }

    let swept = sweep_expired(store, &settings.table, today, settings.retention_days).await;
    summary.deleted = match swept {
        Ok(deleted) => Some(deleted),
        Err(e) => {
            error!(error = %e, "Error while deleting old data");
            None
        }
    };

    Ok(summary)
}
