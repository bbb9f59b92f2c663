//! Rolling retention for the `jobs` table.
//!
//! Each run deletes exactly one crawl date: `today - retention_days` in the
//! regional calendar. The filter is an equality match, not a range, so a
//! skipped day leaves its rows behind until someone removes them by hand.

use super::CRAWLED_DATE_COLUMN;
use crate::error::SweepError;
use crate::store::TableStore;
use crate::utils::retention_cutoff;
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Days a crawl date is kept before it is deleted.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Delete every row of `table` crawled exactly `retention_days` before `today`.
///
/// Returns the number of rows deleted. Zero matches is a success.
///
/// # Errors
///
/// [`SweepError::CutoffOutOfRange`] if the window reaches past the calendar,
/// in which case the store is never called.
#[instrument(level = "info", skip(store))]
pub async fn sweep_expired<S: TableStore>(
    store: &S,
    table: &str,
    today: NaiveDate,
    retention_days: u32,
) -> Result<u64, SweepError> {
    let cutoff = retention_cutoff(today, retention_days).ok_or(SweepError::CutoffOutOfRange {
        today,
        days: retention_days,
    })?;
    info!(%cutoff, "Deleting data for date");

    let deleted = store
        .delete_eq(table, CRAWLED_DATE_COLUMN, &cutoff.format("%Y-%m-%d").to_string())
        .await?;
    info!(%cutoff, deleted, "Successfully deleted data");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::JOBS_TABLE;
    use crate::test_support::{DeleteCall, MemoryStore};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_sweep_deletes_exact_cutoff_date() {
        let store = MemoryStore {
            deleted_rows: 42,
            ..MemoryStore::default()
        };
        let deleted = sweep_expired(&store, JOBS_TABLE, day(2025, 3, 13), DEFAULT_RETENTION_DAYS)
            .await
            .unwrap();

        assert_eq!(deleted, 42);
        assert_eq!(
            store.deletes(),
            vec![DeleteCall {
                table: "jobs".to_string(),
                column: "crawled_date".to_string(),
                value: "2025-03-06".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_sweep_with_nothing_to_delete_succeeds() {
        let store = MemoryStore::default();
        let deleted = sweep_expired(&store, JOBS_TABLE, day(2026, 1, 3), DEFAULT_RETENTION_DAYS)
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(store.deletes()[0].value, "2025-12-27");
    }

    #[tokio::test]
    async fn test_sweep_reports_store_failure() {
        let store = MemoryStore {
            fail_delete: true,
            ..MemoryStore::default()
        };
        let result =
            sweep_expired(&store, JOBS_TABLE, day(2026, 10, 18), DEFAULT_RETENTION_DAYS).await;
        assert!(matches!(result, Err(SweepError::Store(_))));
    }

    #[tokio::test]
    async fn test_sweep_window_past_the_calendar_is_an_error() {
        let store = MemoryStore::default();
        let result = sweep_expired(&store, JOBS_TABLE, day(2026, 10, 18), u32::MAX).await;

        assert!(matches!(
            result,
            Err(SweepError::CutoffOutOfRange { days: u32::MAX, .. })
        ));
        assert!(store.deletes().is_empty());
    }
}
