//! Supabase (PostgREST) implementation of [`TableStore`].
//!
//! Every request carries the project key twice: in the `apikey` header, which
//! the Supabase gateway checks, and as a bearer token, which PostgREST uses to
//! pick the database role.

use super::TableStore;
use crate::config::Credentials;
use crate::error::StoreError;
use crate::utils::truncate_for_log;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use url::Url;

/// A PostgREST client bound to one Supabase project.
pub struct SupabaseClient {
    http: Client,
    rest_url: Url,
    key: String,
}

impl SupabaseClient {
    /// Build a client for the project at `credentials.url`.
    ///
    /// No request is made here. The first failure to reach the project shows
    /// up on the first table operation.
    pub fn connect(credentials: &Credentials) -> Result<Self, StoreError> {
        let mut base = Url::parse(&credentials.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join("rest/v1/")?;
        let http = Client::builder()
            .user_agent(concat!("job_board_sync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(%rest_url, "Supabase client ready");
        Ok(Self {
            http,
            rest_url,
            key: credentials.key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        Ok(self.rest_url.join(table)?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    fn select_request(&self, table: &str) -> Result<RequestBuilder, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(self.request(Method::GET, url))
    }

    fn upsert_request<T: Serialize>(
        &self,
        table: &str,
        rows: &[T],
        on_conflict: &[&str],
    ) -> Result<RequestBuilder, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("on_conflict", &on_conflict.join(","));
        let body = serde_json::to_vec(rows)?;
        Ok(self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body))
    }

    fn delete_request(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<RequestBuilder, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair(column, &format!("eq.{value}"));
        Ok(self
            .request(Method::DELETE, url)
            .header("Prefer", "return=minimal,count=exact"))
    }
}

/// Turn a non-2xx response into [`StoreError::Api`].
async fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    error!(
        status = status.as_u16(),
        body = %truncate_for_log(&message, 300),
        "Supabase request failed"
    );
    Err(StoreError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Total row count from a PostgREST `Content-Range` header (`0-9/10`, `*/3`).
fn content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

impl TableStore for SupabaseClient {
    #[instrument(level = "info", skip(self))]
    async fn select_all(&self, table: &str) -> Result<Vec<Map<String, Value>>, StoreError> {
        let t0 = Instant::now();
        let resp = self.select_request(table)?.send().await?;
        let rows: Vec<Map<String, Value>> = check_status(resp).await?.json().await?;
        info!(
            count = rows.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Selected rows"
        );
        Ok(rows)
    }

    #[instrument(level = "info", skip(self, rows), fields(rows = rows.len()))]
    async fn upsert<T>(
        &self,
        table: &str,
        rows: &[T],
        on_conflict: &[&str],
    ) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let t0 = Instant::now();
        let resp = self.upsert_request(table, rows, on_conflict)?.send().await?;
        check_status(resp).await?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Upserted rows");
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<u64, StoreError> {
        let resp = self.delete_request(table, column, value)?.send().await?;
        let resp = check_status(resp).await?;
        let deleted = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .and_then(content_range_total)
            .unwrap_or(0);
        info!(deleted, "Deleted rows");
        Ok(deleted)
    }
}
