//! Read-only access to the `feedback` table for the inspector binary.

use crate::error::StoreError;
use crate::models::FeedbackEntry;
use crate::store::TableStore;
use tracing::instrument;

pub const FEEDBACK_TABLE: &str = "feedback";

/// Fetch every feedback row.
#[instrument(level = "info", skip(store))]
pub async fn fetch_feedback<S: TableStore>(
    store: &S,
    table: &str,
) -> Result<Vec<FeedbackEntry>, StoreError> {
    store.select_all(table).await
}

/// Human-readable report: a count line, then the rows as pretty JSON.
pub fn render_report(entries: &[FeedbackEntry]) -> Result<String, serde_json::Error> {
    let mut out = format!("Found {} feedback entries.", entries.len());
    if !entries.is_empty() {
        out.push('\n');
        out.push_str(&serde_json::to_string_pretty(entries)?);
    }
    Ok(out)
}
