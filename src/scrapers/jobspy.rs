//! Client for a JobSpy API service.
//!
//! JobSpy does the actual crawling of Indeed, LinkedIn, Google Jobs and the
//! other boards. It runs as a separate HTTP service, and this module only
//! submits searches and collects the result rows.
//!
//! # Request
//!
//! `POST {base}/api/v1/search_jobs` with a [`ScrapeQuery`] as the JSON body.
//! If an API key is configured it is sent in the `x-api-key` header.
//!
//! # Response
//!
//! ```json
//! { "count": 2, "cached": false, "jobs": [ { "site": "indeed", "job_url": "..." }, ... ] }
//! ```

use super::JobScraper;
use crate::error::ScrapeError;
use crate::models::{ScrapeQuery, ScrapedRow};
use crate::utils::truncate_for_log;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

const SEARCH_PATH: &str = "api/v1/search_jobs";

/// Response body of the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    jobs: Vec<ScrapedRow>,
}

/// HTTP client for a JobSpy API deployment.
#[derive(Debug, Clone)]
pub struct JobSpyClient {
    http: Client,
    search_url: Url,
    api_key: Option<String>,
}

impl JobSpyClient {
    /// Create a client for the service rooted at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, ScrapeError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(concat!("job_board_sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            search_url: base.join(SEARCH_PATH)?,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn search_request(&self, query: &ScrapeQuery) -> RequestBuilder {
        let req = self.http.post(self.search_url.clone()).json(query);
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

impl JobScraper for JobSpyClient {
    #[instrument(
        level = "info",
        skip_all,
        fields(role = %query.search_term, location = %query.location)
    )]
    async fn scrape(&self, query: &ScrapeQuery) -> Result<Vec<ScrapedRow>, ScrapeError> {
        let t0 = Instant::now();
        let resp = self.search_request(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %truncate_for_log(&message, 300),
                "Scraper rejected search"
            );
            return Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = resp.json().await?;
        if let Some(count) = body.count.filter(|c| *c != body.jobs.len()) {
            debug!(count, received = body.jobs.len(), "Scraper count differs from rows received");
        }
        debug!(
            rows = body.jobs.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Scrape finished"
        );
        Ok(body.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn query() -> ScrapeQuery {
        ScrapeQuery {
            site_name: vec!["indeed".to_string(), "linkedin".to_string()],
            search_term: "engineer".to_string(),
            google_search_term: "engineer jobs near Pune since yesterday".to_string(),
            location: "Pune, Maharashtra, India".to_string(),
            results_wanted: 50,
            hours_old: 24,
            country_indeed: "INDIA".to_string(),
            linkedin_fetch_description: true,
        }
    }

    #[test]
    fn test_search_request_shape() {
        let client = JobSpyClient::new("http://localhost:8000", Some("k3y".to_string())).unwrap();
        let req = client.search_request(&query()).build().unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().as_str(), "http://localhost:8000/api/v1/search_jobs");
        assert_eq!(req.headers()["x-api-key"], "k3y");

        let bytes = req.body().and_then(|b| b.as_bytes()).unwrap();
        let body: Value = serde_json::from_slice(bytes).unwrap();
        assert_eq!(body["search_term"], json!("engineer"));
        assert_eq!(body["site_name"], json!(["indeed", "linkedin"]));
        assert_eq!(body["hours_old"], json!(24));
    }

    #[test]
    fn test_search_url_under_prefix() {
        let client = JobSpyClient::new("https://scraper.internal/jobspy", None).unwrap();
        assert_eq!(
            client.search_url.as_str(),
            "https://scraper.internal/jobspy/api/v1/search_jobs"
        );
    }

    #[test]
    fn test_empty_api_key_is_not_sent() {
        let client = JobSpyClient::new("http://localhost:8000", Some(String::new())).unwrap();
        let req = client.search_request(&query()).build().unwrap();
        assert!(req.headers().get("x-api-key").is_none());
    }

    #[test]
    fn test_search_response_parsing() {
        let body: SearchResponse = serde_json::from_value(json!({
            "count": 1,
            "cached": false,
            "jobs": [{
                "site": "indeed",
                "job_url": "https://in.indeed.com/viewjob?jk=1",
                "min_amount": null
            }]
        }))
        .unwrap();
        assert_eq!(body.count, Some(1));
        assert_eq!(body.jobs.len(), 1);
        assert_eq!(body.jobs[0]["site"], json!("indeed"));
    }

    #[test]
    fn test_search_response_without_jobs() {
        let body: SearchResponse = serde_json::from_value(json!({ "count": 0 })).unwrap();
        assert!(body.jobs.is_empty());
    }
}
