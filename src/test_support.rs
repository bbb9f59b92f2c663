//! In-memory fakes of the scraper and the datastore for unit tests.

use crate::config::SearchConfig;
use crate::error::{ScrapeError, StoreError};
use crate::models::{ScrapeQuery, ScrapedRow};
use crate::scrapers::JobScraper;
use crate::store::TableStore;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn config(roles: &[&str], cities: &[(&str, &str)]) -> SearchConfig {
    SearchConfig {
        roles: roles.iter().map(|r| r.to_string()).collect(),
        cities: cities
            .iter()
            .map(|(label, location)| (label.to_string(), location.to_string()))
            .collect(),
    }
}

pub fn row(job_url: &str) -> ScrapedRow {
    let mut row = Map::new();
    row.insert("job_url".to_string(), json!(job_url));
    row
}

pub fn row_from(value: Value) -> ScrapedRow {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Scripted responses keyed by (search term, location). Unknown pairs return no rows.
#[derive(Default)]
pub struct FakeScraper {
    pub responses: HashMap<(String, String), Option<Vec<ScrapedRow>>>,
    pub queries: Mutex<Vec<ScrapeQuery>>,
}

impl FakeScraper {
    pub fn respond(mut self, role: &str, location: &str, rows: Vec<ScrapedRow>) -> Self {
        self.responses
            .insert((role.to_string(), location.to_string()), Some(rows));
        self
    }

    pub fn fail(mut self, role: &str, location: &str) -> Self {
        self.responses
            .insert((role.to_string(), location.to_string()), None);
        self
    }

    pub fn queries(&self) -> Vec<ScrapeQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl JobScraper for FakeScraper {
    async fn scrape(&self, query: &ScrapeQuery) -> Result<Vec<ScrapedRow>, ScrapeError> {
        self.queries.lock().unwrap().push(query.clone());
        let key = (query.search_term.clone(), query.location.clone());
        match self.responses.get(&key) {
            Some(Some(rows)) => Ok(rows.clone()),
            Some(None) => Err(ScrapeError::Api {
                status: 500,
                message: "scraper blew up".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertCall {
    pub table: String,
    pub rows: Vec<Value>,
    pub on_conflict: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCall {
    pub table: String,
    pub column: String,
    pub value: String,
}

/// Records every call. Upserts fail from the `fail_upsert_at`-th call on.
#[derive(Default)]
pub struct MemoryStore {
    pub tables: HashMap<String, Vec<Map<String, Value>>>,
    pub fail_select: bool,
    pub fail_upsert_at: Option<usize>,
    pub fail_delete: bool,
    pub deleted_rows: u64,
    pub upserts: Mutex<Vec<UpsertCall>>,
    pub deletes: Mutex<Vec<DeleteCall>>,
}

impl MemoryStore {
    pub fn upserts(&self) -> Vec<UpsertCall> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<DeleteCall> {
        self.deletes.lock().unwrap().clone()
    }
}

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        message: "store unavailable".to_string(),
    }
}

impl TableStore for MemoryStore {
    async fn select_all(&self, table: &str) -> Result<Vec<Map<String, Value>>, StoreError> {
        if self.fail_select {
            return Err(unavailable());
        }
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }

    async fn upsert<T>(
        &self,
        table: &str,
        rows: &[T],
        on_conflict: &[&str],
    ) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let mut upserts = self.upserts.lock().unwrap();
        if self.fail_upsert_at.is_some_and(|n| upserts.len() >= n) {
            return Err(unavailable());
        }
        let rows = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        upserts.push(UpsertCall {
            table: table.to_string(),
            rows,
            on_conflict: on_conflict.iter().map(|c| c.to_string()).collect(),
        });
        Ok(())
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<u64, StoreError> {
        self.deletes.lock().unwrap().push(DeleteCall {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        });
        if self.fail_delete {
            return Err(unavailable());
        }
        Ok(self.deleted_rows)
    }
}
