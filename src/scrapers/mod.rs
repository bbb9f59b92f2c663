//! Job-board scraping.
//!
//! The crawling itself is done by an external scraping service. This module
//! defines the [`JobScraper`] seam and the driver that fans one search out per
//! (role, city) pair.
//!
//! # Failure policy
//!
//! Searches run one after another. A failed search is skipped entirely. No
//! rows are kept from it and it is not retried. Each failure is recorded in
//! the [`ScrapeReport`] so the run can log them together at the end.
//!
//! # Implementations
//!
//! | Scraper | Module | Transport |
//! |---------|--------|-----------|
//! | JobSpy API | [`jobspy`] | `POST /api/v1/search_jobs` |

pub mod jobspy;

use crate::config::SearchConfig;
use crate::error::ScrapeError;
use crate::models::{ScrapeBatch, ScrapeQuery, ScrapedRow};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// Something that can run one job search and return the raw rows.
pub trait JobScraper {
    /// Run `query`, returning the scraped rows in result order.
    async fn scrape(&self, query: &ScrapeQuery) -> Result<Vec<ScrapedRow>, ScrapeError>;
}

/// Search parameters shared by every (role, city) query of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSettings {
    pub sites: Vec<String>,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub country_indeed: String,
    pub fetch_descriptions: bool,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            sites: vec![
                "indeed".to_string(),
                "linkedin".to_string(),
                "google".to_string(),
            ],
            results_wanted: 50,
            hours_old: 24,
            country_indeed: "INDIA".to_string(),
            fetch_descriptions: true,
        }
    }
}

impl ScrapeSettings {
    /// Build the query for one role in one city.
    pub fn query(&self, role: &str, city: &str, location: &str) -> ScrapeQuery {
        ScrapeQuery {
            site_name: self.sites.clone(),
            search_term: role.to_string(),
            google_search_term: format!("{role} jobs near {city} since yesterday"),
            location: location.to_string(),
            results_wanted: self.results_wanted,
            hours_old: self.hours_old,
            country_indeed: self.country_indeed.clone(),
            linkedin_fetch_description: self.fetch_descriptions,
        }
    }
}

/// A (role, city) search that failed and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeFailure {
    pub role: String,
    pub city: String,
    pub error: String,
}

/// Outcome of scraping every (role, city) pair.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Number of searches attempted.
    pub attempted: usize,
    /// Non-empty results, in search order.
    pub batches: Vec<ScrapeBatch>,
    /// Searches that failed.
    pub failures: Vec<ScrapeFailure>,
}

impl ScrapeReport {
    /// Total rows across all batches.
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.rows.len()).sum()
    }
}

/// Run one search per role × city, roles outer, in config order.
#[instrument(
    level = "info",
    skip_all,
    fields(roles = config.roles.len(), cities = config.cities.len())
)]
pub async fn scrape_all<S: JobScraper>(
    scraper: &S,
    config: &SearchConfig,
    settings: &ScrapeSettings,
) -> ScrapeReport {
    let outcomes: Vec<(String, String, Result<Vec<ScrapedRow>, ScrapeError>)> =
        stream::iter(config.roles.iter().cartesian_product(config.cities.iter()))
            .then(|(role, (city, location))| {
                let query = settings.query(role, city, location);
                async move {
                    info!(%role, %city, "Scraping");
                    let result = scraper.scrape(&query).await;
                    (role.clone(), city.clone(), result)
                }
            })
            .collect()
            .await;

    let mut report = ScrapeReport {
        attempted: outcomes.len(),
        ..ScrapeReport::default()
    };
    for (role, city, result) in outcomes {
        match result {
            Ok(rows) if rows.is_empty() => {
                debug!(%role, %city, "Search returned no rows");
            }
            Ok(rows) => {
                debug!(%role, %city, rows = rows.len(), "Search succeeded");
                report.batches.push(ScrapeBatch { role, city, rows });
            }
            Err(e) => {
                warn!(%role, %city, error = %e, "Search failed; skipping");
                report.failures.push(ScrapeFailure {
                    role,
                    city,
                    error: e.to_string(),
                });
            }
        }
    }

    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            attempted = report.attempted,
            "Some searches failed and were skipped"
        );
    }
    info!(
        attempted = report.attempted,
        batches = report.batches.len(),
        rows = report.row_count(),
        "Scraping finished"
    );
    report
}
