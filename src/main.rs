//! `job_board_sync`: scrape, normalize, upsert and expire job listings.
//!
//! ## Usage
//!
//! ```sh
//! SUPABASE_URL=https://xyz.supabase.co SUPABASE_KEY=... \
//! JOBSPY_API_URL=http://localhost:8000 \
//!     job_board_sync --config scraper_config.json
//! ```
//!
//! Exits non-zero when credentials are missing, the config is malformed, or
//! an upsert batch fails. Search and retention failures are only logged.

use clap::Parser;
use job_board_sync::cli::Cli;
use job_board_sync::config::{Credentials, SearchConfig};
use job_board_sync::pipeline;
use job_board_sync::scrapers::jobspy::JobSpyClient;
use job_board_sync::store::supabase::SupabaseClient;
use job_board_sync::utils::regional_today;
use std::error::Error;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    job_board_sync::init_tracing();

    let start_time = std::time::Instant::now();
    info!("job_board_sync starting up");

    let args = Cli::parse();
    debug!(?args.config, %args.jobspy_url, ?args.sites, "Parsed CLI arguments");

    let config = SearchConfig::load(&args.config)?;

    let credentials = match Credentials::resolve(&args.fallback_env_file) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "Cannot reach the datastore without credentials");
            return Err(e.into());
        }
    };
    let store = SupabaseClient::connect(&credentials)?;
    let scraper = JobSpyClient::new(&args.jobspy_url, args.jobspy_api_key.clone())?;

    let today = regional_today(args.utc_offset);
    info!(%today, offset = %args.utc_offset, "Crawl date");

    let summary = pipeline::run(&config, &scraper, &store, &args.ingest_settings(), today).await?;
    drop(store);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        searches = summary.searches,
        failed_searches = summary.failed_searches,
        scraped_rows = summary.scraped_rows,
        listings = summary.listings,
        duplicates_dropped = summary.duplicates_dropped,
        batches = summary.written.batches,
        deleted = ?summary.deleted,
        "Execution complete"
    );

    Ok(())
}
