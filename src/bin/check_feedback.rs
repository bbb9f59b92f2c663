//! `check_feedback`: print every row of the Supabase `feedback` table.
//!
//! Exits with status 1 when no credentials can be found. A failed query is
//! reported and the process still exits normally.

use clap::Parser;
use job_board_sync::cli::FeedbackCli;
use job_board_sync::config::Credentials;
use job_board_sync::feedback::{FEEDBACK_TABLE, fetch_feedback, render_report};
use job_board_sync::store::supabase::SupabaseClient;
use std::error::Error;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    job_board_sync::init_tracing();
    let args = FeedbackCli::parse();

    let credentials = match Credentials::resolve(&args.fallback_env_file) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(
                error = %e,
                fallback = %args.fallback_env_file.display(),
                "No credentials found"
            );
            println!("Missing Supabase credentials");
            std::process::exit(1);
        }
    };

    println!("Connecting to {}", credentials.url);
    let outcome = match SupabaseClient::connect(&credentials) {
        Ok(store) => fetch_feedback(&store, FEEDBACK_TABLE).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(entries) => {
            info!(count = entries.len(), "Fetched feedback");
            println!("{}", render_report(&entries)?);
        }
        Err(e) => {
            error!(error = %e, "Feedback query failed");
            println!("Error: {e}");
        }
    }

    Ok(())
}
