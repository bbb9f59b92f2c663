//! # Job Board Sync
//!
//! A batch pipeline that scrapes job listings from several job boards,
//! normalizes them into one schema, and upserts them into a Supabase `jobs`
//! table. Rows older than the retention window are then deleted.
//!
//! ## Architecture
//!
//! 1. **Config**: roles and cities from `scraper_config.json` ([`config`])
//! 2. **Scraping**: one search per role × city through a JobSpy API service ([`scrapers`])
//! 3. **Normalizing**: dedupe, null/date/nested cleanup, split into
//!    [`models::Listing`] ([`normalize`])
//! 4. **Output**: batched upsert and the retention sweep ([`outputs`])
//!
//! [`pipeline::run`] wires these together. The `check_feedback` binary uses
//! [`feedback`] to dump the frontend's feedback table.
//!
//! Everything runs sequentially. The datastore client is built once by the
//! binary and handed to each stage by reference.

pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod store;
pub mod utils;

#[cfg(test)]
mod test_support;

/// Install the global tracing subscriber used by both binaries.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt as tfmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
