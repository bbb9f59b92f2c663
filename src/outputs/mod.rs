//! Writing listings to the datastore and expiring old ones.
//!
//! # Submodules
//!
//! - [`upsert`]: writes normalized listings to `jobs` in fixed-size batches
//! - [`retention`]: deletes the crawl date that just left the retention window
//!
//! # Table layout
//!
//! ```text
//! jobs
//! ├── site, job_url, ..., work_from_home_type   # fixed schema
//! ├── role, city, crawled_date                  # added by the pipeline
//! └── raw_data                                  # everything else, as JSON
//!
//! unique (job_url, crawled_date)                # upsert conflict key
//! ```

pub mod retention;
pub mod upsert;

/// Table the pipeline writes to.
pub const JOBS_TABLE: &str = "jobs";

/// Column holding the crawl date, used for both the conflict key and retention.
pub const CRAWLED_DATE_COLUMN: &str = "crawled_date";

/// Natural key used to resolve upsert conflicts.
pub const CONFLICT_KEY: [&str; 2] = ["job_url", CRAWLED_DATE_COLUMN];
