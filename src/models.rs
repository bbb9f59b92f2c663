//! Data models for scrape requests, scraped rows and stored listings.
//!
//! - [`ScrapeQuery`]: one request to the scraping service
//! - [`ScrapedRow`]: an untyped row exactly as the scraper returned it
//! - [`ScrapeBatch`]: the rows produced by a single (role, city) search
//! - [`Listing`]: the typed record written to the `jobs` table
//! - [`FeedbackEntry`]: an opaque row of the `feedback` table
//!
//! The scraper's column set changes from site to site, so scraped rows stay
//! dynamic JSON objects until [`Listing::from_row`] splits them into the
//! fixed schema plus the catch-all `raw_data` object.

use crate::error::ListingError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single scraped row, column name to value, in scraper order.
pub type ScrapedRow = Map<String, Value>;

/// A row of the `feedback` table. Its shape is owned by the frontend.
pub type FeedbackEntry = Map<String, Value>;

/// Columns holding lists or objects that must be stored as JSON text.
pub const NESTED_COLUMNS: [&str; 4] = ["emails", "skills", "company_addresses", "description"];

/// The `jobs` table schema, in wire order. `raw_data` follows these.
pub const LISTING_COLUMNS: [&str; 31] = [
    "site",
    "job_url",
    "job_url_direct",
    "title",
    "company",
    "location",
    "date_posted",
    "job_type",
    "is_remote",
    "job_level",
    "job_function",
    "listing_type",
    "emails",
    "description",
    "company_industry",
    "company_url",
    "company_logo",
    "company_url_direct",
    "company_addresses",
    "company_num_employees",
    "company_revenue",
    "company_description",
    "skills",
    "experience_range",
    "company_rating",
    "company_reviews_count",
    "vacancy_count",
    "work_from_home_type",
    "role",
    "city",
    "crawled_date",
];

/// Parameters for one call to the scraping service.
///
/// Field names follow the JobSpy `scrape_jobs` keyword arguments so the
/// struct can be sent as the request body unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeQuery {
    /// Job boards to search (e.g. `indeed`, `linkedin`, `google`).
    pub site_name: Vec<String>,
    /// The role being searched for.
    pub search_term: String,
    /// Natural-language query for Google Jobs, which ignores `search_term`.
    pub google_search_term: String,
    /// Full location string for the city.
    pub location: String,
    /// Upper bound on rows per site.
    pub results_wanted: u32,
    /// Only listings posted within this many hours.
    pub hours_old: u32,
    /// Country filter used by Indeed and Glassdoor.
    pub country_indeed: String,
    /// Fetch full LinkedIn descriptions (one extra request per listing).
    pub linkedin_fetch_description: bool,
}

/// The rows returned by one successful (role, city) search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeBatch {
    pub role: String,
    pub city: String,
    pub rows: Vec<ScrapedRow>,
}

/// A normalized job listing, one row of the `jobs` table.
///
/// `(job_url, crawled_date)` is the natural key used for upsert conflict
/// resolution. Every optional column serializes as `null` when absent, so
/// each upsert payload carries the full column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub site: Option<String>,
    pub job_url: String,
    pub job_url_direct: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub date_posted: Option<String>,
    pub job_type: Option<String>,
    pub is_remote: Option<bool>,
    pub job_level: Option<String>,
    pub job_function: Option<String>,
    pub listing_type: Option<String>,
    pub emails: Option<String>,
    pub description: Option<String>,
    pub company_industry: Option<String>,
    pub company_url: Option<String>,
    pub company_logo: Option<String>,
    pub company_url_direct: Option<String>,
    pub company_addresses: Option<String>,
    pub company_num_employees: Option<String>,
    pub company_revenue: Option<String>,
    pub company_description: Option<String>,
    pub skills: Option<String>,
    pub experience_range: Option<String>,
    pub company_rating: Option<f64>,
    pub company_reviews_count: Option<i64>,
    pub vacancy_count: Option<i64>,
    pub work_from_home_type: Option<String>,
    /// Search term that produced this row.
    pub role: String,
    /// City label that produced this row.
    pub city: String,
    /// Regional calendar date of the run that stored this row.
    pub crawled_date: NaiveDate,
    /// Every scraped column outside the schema above.
    pub raw_data: Map<String, Value>,
}

impl Listing {
    /// Split an already normalized row into the typed schema and `raw_data`.
    ///
    /// `role`, `city` and `crawled_date` come from the pipeline and replace
    /// any scraper column with the same name. A value that does not fit its
    /// typed column (say `is_remote: "hybrid"`) leaves the column `None` and
    /// is kept in `raw_data` under its original name.
    ///
    /// # Errors
    ///
    /// [`ListingError::MissingJobUrl`] if the row has no usable `job_url`.
    pub fn from_row(
        row: ScrapedRow,
        role: &str,
        city: &str,
        crawled_date: NaiveDate,
    ) -> Result<Self, ListingError> {
        let mut cols = Columns::new(row);
        for owned in ["role", "city", "crawled_date"] {
            cols.discard(owned);
        }
        let job_url = cols.text("job_url").ok_or(ListingError::MissingJobUrl)?;

        Ok(Self {
            site: cols.text("site"),
            job_url,
            job_url_direct: cols.text("job_url_direct"),
            title: cols.text("title"),
            company: cols.text("company"),
            location: cols.text("location"),
            date_posted: cols.text("date_posted"),
            job_type: cols.text("job_type"),
            is_remote: cols.flag("is_remote"),
            job_level: cols.text("job_level"),
            job_function: cols.text("job_function"),
            listing_type: cols.text("listing_type"),
            emails: cols.text("emails"),
            description: cols.text("description"),
            company_industry: cols.text("company_industry"),
            company_url: cols.text("company_url"),
            company_logo: cols.text("company_logo"),
            company_url_direct: cols.text("company_url_direct"),
            company_addresses: cols.text("company_addresses"),
            company_num_employees: cols.text("company_num_employees"),
            company_revenue: cols.text("company_revenue"),
            company_description: cols.text("company_description"),
            skills: cols.text("skills"),
            experience_range: cols.text("experience_range"),
            company_rating: cols.float("company_rating"),
            company_reviews_count: cols.integer("company_reviews_count"),
            vacancy_count: cols.integer("vacancy_count"),
            work_from_home_type: cols.text("work_from_home_type"),
            role: role.to_string(),
            city: city.to_string(),
            crawled_date,
            raw_data: cols.into_raw(),
        })
    }
}

/// Pulls schema columns out of a row, remembering values that failed to coerce.
struct Columns {
    row: ScrapedRow,
    rejected: ScrapedRow,
}

impl Columns {
    fn new(row: ScrapedRow) -> Self {
        Self {
            row,
            rejected: Map::new(),
        }
    }

    fn discard(&mut self, key: &str) {
        self.row.shift_remove(key);
    }

    fn coerce<T>(&mut self, key: &str, convert: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let value = self.row.shift_remove(key)?;
        if value.is_null() {
            return None;
        }
        let converted = convert(&value);
        if converted.is_none() {
            self.rejected.insert(key.to_string(), value);
        }
        converted
    }

    fn text(&mut self, key: &str) -> Option<String> {
        self.coerce(key, as_text)
    }

    fn flag(&mut self, key: &str) -> Option<bool> {
        self.coerce(key, as_flag)
    }

    fn float(&mut self, key: &str) -> Option<f64> {
        self.coerce(key, as_float)
    }

    fn integer(&mut self, key: &str) -> Option<i64> {
        self.coerce(key, as_integer)
    }

    fn into_raw(mut self) -> ScrapedRow {
        self.row.extend(self.rejected);
        self.row
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// Integer columns with gaps come out of dataframes as floats (`12.0`).
// Floats outside the i64 range are rejected rather than saturated.
fn as_integer(value: &Value) -> Option<i64> {
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = i64::MAX as f64;

    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| (LOWER..UPPER).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ScrapedRow {
        match value {
            Value::Object(map) => map,
            _ => panic!("test row must be an object"),
        }
    }

    fn crawl_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn test_from_row_maps_schema_columns() {
        let scraped = row(json!({
            "id": "in-123",
            "site": "indeed",
            "job_url": "https://in.indeed.com/viewjob?jk=123",
            "title": "Backend Engineer",
            "company": "Acme",
            "is_remote": false,
            "company_rating": 4.2,
            "vacancy_count": 3,
            "min_amount": 1200000.0,
            "currency": "INR"
        }));

        let listing = Listing::from_row(scraped, "engineer", "Pune", crawl_date()).unwrap();

        assert_eq!(listing.site.as_deref(), Some("indeed"));
        assert_eq!(listing.job_url, "https://in.indeed.com/viewjob?jk=123");
        assert_eq!(listing.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(listing.is_remote, Some(false));
        assert_eq!(listing.company_rating, Some(4.2));
        assert_eq!(listing.vacancy_count, Some(3));
        assert_eq!(listing.role, "engineer");
        assert_eq!(listing.city, "Pune");
        assert_eq!(listing.crawled_date, crawl_date());

        let raw_keys: Vec<&str> = listing.raw_data.keys().map(String::as_str).collect();
        assert_eq!(raw_keys, vec!["id", "min_amount", "currency"]);
    }

    #[test]
    fn test_from_row_requires_job_url() {
        let scraped = row(json!({ "title": "No URL", "job_url": null }));
        assert_eq!(
            Listing::from_row(scraped, "engineer", "Pune", crawl_date()),
            Err(ListingError::MissingJobUrl)
        );
    }

    #[test]
    fn test_from_row_pipeline_columns_override_scraper() {
        let scraped = row(json!({
            "job_url": "https://example.com/1",
            "role": "scraper-role",
            "city": "scraper-city",
            "crawled_date": "1999-01-01"
        }));

        let listing = Listing::from_row(scraped, "engineer", "Pune", crawl_date()).unwrap();
        assert_eq!(listing.role, "engineer");
        assert_eq!(listing.city, "Pune");
        assert_eq!(listing.crawled_date, crawl_date());
        assert!(listing.raw_data.is_empty());
    }

    #[test]
    fn test_from_row_keeps_uncoercible_values_in_raw_data() {
        let scraped = row(json!({
            "job_url": "https://example.com/1",
            "is_remote": "hybrid",
            "company_reviews_count": "lots"
        }));

        let listing = Listing::from_row(scraped, "engineer", "Pune", crawl_date()).unwrap();
        assert_eq!(listing.is_remote, None);
        assert_eq!(listing.company_reviews_count, None);
        assert_eq!(listing.raw_data.get("is_remote"), Some(&json!("hybrid")));
        assert_eq!(listing.raw_data.get("company_reviews_count"), Some(&json!("lots")));
    }

    #[test]
    fn test_from_row_rejects_integers_out_of_range() {
        let scraped = row(json!({
            "job_url": "https://example.com/1",
            "vacancy_count": 1e20,
            "company_reviews_count": -1e19,
            "company_rating": 4.0
        }));

        let listing = Listing::from_row(scraped, "engineer", "Pune", crawl_date()).unwrap();
        assert_eq!(listing.vacancy_count, None);
        assert_eq!(listing.company_reviews_count, None);
        assert_eq!(listing.raw_data.get("vacancy_count"), Some(&json!(1e20)));
        assert_eq!(listing.raw_data.get("company_reviews_count"), Some(&json!(-1e19)));
        assert_eq!(listing.company_rating, Some(4.0));
    }

    #[test]
    fn test_from_row_coerces_loose_scalars() {
        let scraped = row(json!({
            "job_url": "https://example.com/1",
            "is_remote": "True",
            "company_reviews_count": 120.0,
            "company_rating": "3.5",
            "company_num_employees": 5000
        }));

        let listing = Listing::from_row(scraped, "engineer", "Pune", crawl_date()).unwrap();
        assert_eq!(listing.is_remote, Some(true));
        assert_eq!(listing.company_reviews_count, Some(120));
        assert_eq!(listing.company_rating, Some(3.5));
        assert_eq!(listing.company_num_employees.as_deref(), Some("5000"));
        assert!(listing.raw_data.is_empty());
    }

    #[test]
    fn test_listing_serializes_every_column_in_order() {
        let scraped = row(json!({ "job_url": "https://example.com/1" }));
        let listing = Listing::from_row(scraped, "engineer", "Pune", crawl_date()).unwrap();

        let value = serde_json::to_value(&listing).unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();

        let mut expected = LISTING_COLUMNS.to_vec();
        expected.push("raw_data");
        assert_eq!(keys, expected);
        assert_eq!(object["title"], Value::Null);
        assert_eq!(object["crawled_date"], json!("2026-10-18"));
    }

    #[test]
    fn test_scrape_query_serializes_scraper_arguments() {
        let query = ScrapeQuery {
            site_name: vec!["indeed".to_string()],
            search_term: "engineer".to_string(),
            google_search_term: "engineer jobs near Pune since yesterday".to_string(),
            location: "Pune, Maharashtra, India".to_string(),
            results_wanted: 50,
            hours_old: 24,
            country_indeed: "INDIA".to_string(),
            linkedin_fetch_description: true,
        };

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["site_name"], json!(["indeed"]));
        assert_eq!(json["results_wanted"], json!(50));
        assert_eq!(json["linkedin_fetch_description"], json!(true));
    }
}
