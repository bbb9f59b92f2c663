//! Batched upsert of listings.
//!
//! Batches keep each request body bounded. They are written one after
//! another, and the first failing batch aborts the write. Batches already
//! written stay written, since nothing is rolled back.

use super::CONFLICT_KEY;
use crate::error::StoreError;
use crate::models::Listing;
use crate::store::TableStore;
use tracing::{error, info, instrument};

/// Records per upsert request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// What a successful write did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub batches: usize,
    pub rows: usize,
}

/// Upsert `listings` into `table` in chunks of `batch_size`.
///
/// # Arguments
///
/// * `store` - The datastore to write to
/// * `table` - Target table, normally [`super::JOBS_TABLE`]
/// * `listings` - Normalized listings, unique by conflict key
/// * `batch_size` - Records per request; must be non-zero
///
/// # Errors
///
/// Returns the first [`StoreError`]. Later batches are not attempted.
#[instrument(level = "info", skip(store, listings), fields(listings = listings.len()))]
pub async fn write_listings<S: TableStore>(
    store: &S,
    table: &str,
    listings: &[Listing],
    batch_size: usize,
) -> Result<WriteSummary, StoreError> {
    let mut summary = WriteSummary::default();

    for (index, chunk) in listings.chunks(batch_size.max(1)).enumerate() {
        if let Err(e) = store.upsert(table, chunk, &CONFLICT_KEY).await {
            error!(
                batch = index,
                rows = chunk.len(),
                written = summary.rows,
                error = %e,
                "Upsert batch failed; aborting write"
            );
            return Err(e);
        }
        summary.batches += 1;
        summary.rows += chunk.len();
        info!(batch = index, rows = chunk.len(), "Upserted batch");
    }

    info!(batches = summary.batches, rows = summary.rows, "Inserted jobs successfully");
    Ok(summary)
}
