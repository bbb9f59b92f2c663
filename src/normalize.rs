//! Turn scraped result sets into [`Listing`]s ready for the `jobs` table.
//!
//! The steps, in order:
//!
//! 1. Concatenate every batch, keeping search order.
//! 2. Tag each row with the role and city of its batch and the crawl date.
//! 3. Replace missing markers (`null`, `"NaN"`, `"NaT"`, ...) with `null`.
//! 4. Render date and time values in columns named `*date*` / `*time*` as
//!    canonical text. Anything that is not a date passes through.
//! 5. Serialize lists and objects in [`NESTED_COLUMNS`] to JSON text.
//! 6. Drop rows without a `job_url`, then keep the first row per `job_url`.
//!    The store rejects an upsert batch that touches the same conflict key
//!    twice.
//! 7. Split each row into the typed schema and `raw_data`. Every listing's
//!    `raw_data` carries the same extra columns, `null` where its row had none.
//!
//! Steps 3 to 5 are idempotent, so normalizing already normalized data is a
//! no-op.

use crate::models::{LISTING_COLUMNS, Listing, NESTED_COLUMNS, ScrapeBatch, ScrapedRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use indexmap::IndexSet;
use itertools::Itertools;
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

/// String forms that dataframe-based scrapers use for "no value".
pub const MISSING_MARKERS: [&str; 6] = ["NaN", "nan", "NaT", "<NA>", "None", "null"];

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Result of a normalization pass.
#[derive(Debug, Default)]
pub struct Normalized {
    /// Listings in first-seen order, unique by `job_url`.
    pub listings: Vec<Listing>,
    /// Rows discarded because an earlier row had the same `job_url`.
    pub duplicates_dropped: usize,
    /// Rows discarded because they had no `job_url`.
    pub missing_url_dropped: usize,
}

/// Normalize every scraped batch into listings stamped with `crawl_date`.
///
/// An empty `batches` is a valid input and yields no listings.
#[instrument(level = "info", skip_all, fields(batches = batches.len(), %crawl_date))]
pub fn normalize(batches: Vec<ScrapeBatch>, crawl_date: NaiveDate) -> Normalized {
    let tagged: Vec<_> = batches
        .into_iter()
        .flat_map(|batch| {
            let ScrapeBatch { role, city, rows } = batch;
            rows.into_iter()
                .map(move |row| (role.clone(), city.clone(), normalize_row(row)))
        })
        .collect();
    let extra_columns = extra_columns(tagged.iter().map(|(_, _, row)| row));

    let (with_url, without_url): (Vec<_>, Vec<_>) =
        tagged.into_iter().partition(|(_, _, row)| job_url_key(row).is_some());
    if !without_url.is_empty() {
        warn!(count = without_url.len(), "Dropping rows without a job_url");
    }

    let with_url_count = with_url.len();
    let unique: Vec<_> = with_url
        .into_iter()
        .unique_by(|(_, _, row)| job_url_key(row))
        .collect();
    let duplicates_dropped = with_url_count - unique.len();

    let listings: Vec<Listing> = unique
        .into_iter()
        .filter_map(|(role, city, row)| {
            match Listing::from_row(row, &role, &city, crawl_date) {
                Ok(mut listing) => {
                    let raw = std::mem::take(&mut listing.raw_data);
                    listing.raw_data = pad_raw_data(raw, &extra_columns);
                    Some(listing)
                }
                Err(e) => {
                    warn!(%role, %city, error = %e, "Skipping row");
                    None
                }
            }
        })
        .collect();

    info!(
        listings = listings.len(),
        duplicates_dropped,
        missing_url_dropped = without_url.len(),
        "Normalized scraped rows"
    );
    Normalized {
        listings,
        duplicates_dropped,
        missing_url_dropped: without_url.len(),
    }
}

/// Normalize every value of a row in place of its column.
pub fn normalize_row(row: ScrapedRow) -> ScrapedRow {
    row.into_iter()
        .map(|(column, value)| {
            let value = normalize_value(&column, value);
            (column, value)
        })
        .collect()
}

/// Apply the missing-marker, temporal and nested rules to one cell.
pub fn normalize_value(column: &str, value: Value) -> Value {
    if is_missing(&value) {
        return Value::Null;
    }
    let value = match value {
        Value::String(s) if is_temporal_column(column) => {
            Value::String(canonical_temporal(&s).unwrap_or(s))
        }
        other => other,
    };
    if NESTED_COLUMNS.contains(&column) && (value.is_array() || value.is_object()) {
        return Value::String(value.to_string());
    }
    value
}

pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => MISSING_MARKERS.contains(&s.as_str()),
        _ => false,
    }
}

pub fn is_temporal_column(column: &str) -> bool {
    column.contains("date") || column.contains("time")
}

/// Canonical text for a date or datetime string, or `None` if `s` is neither.
///
/// - date: `2025-03-13`
/// - naive datetime: `2025-03-13T09:30:00`, with `.fff`/`.ffffff` when present
/// - datetime with offset: RFC 3339 with a numeric offset, `2025-03-13T09:30:00+05:30`
pub fn canonical_temporal(s: &str) -> Option<String> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    let with_offset = DateTime::parse_from_rfc3339(s).ok().or_else(|| {
        OFFSET_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    });
    if let Some(dt) = with_offset {
        return Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

/// Columns outside the fixed schema, in first-seen order across all rows.
fn extra_columns<'a>(rows: impl Iterator<Item = &'a ScrapedRow>) -> IndexSet<String> {
    rows.flat_map(|row| row.keys())
        .filter(|column| !LISTING_COLUMNS.contains(&column.as_str()))
        .cloned()
        .collect()
}

/// Reorder `raw` to `extra`, filling absent columns with `null`. Values a
/// typed column rejected keep their place after those.
fn pad_raw_data(mut raw: Map<String, Value>, extra: &IndexSet<String>) -> Map<String, Value> {
    let mut padded: Map<String, Value> = extra
        .iter()
        .map(|column| (column.clone(), raw.shift_remove(column).unwrap_or(Value::Null)))
        .collect();
    padded.extend(raw);
    padded
}

fn job_url_key(row: &ScrapedRow) -> Option<String> {
    match row.get("job_url")? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
