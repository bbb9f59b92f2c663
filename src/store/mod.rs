//! Table-oriented access to the hosted datastore.
//!
//! [`TableStore`] is the seam between the pipeline and the datastore. The
//! production implementation is [`supabase::SupabaseClient`], which speaks
//! PostgREST over HTTP. Tests use an in-memory store.
//!
//! # Operations
//!
//! | Operation | PostgREST request |
//! |-----------|-------------------|
//! | [`TableStore::select_all`] | `GET /rest/v1/{table}?select=*` |
//! | [`TableStore::upsert`] | `POST /rest/v1/{table}?on_conflict=a,b`, merge duplicates |
//! | [`TableStore::delete_eq`] | `DELETE /rest/v1/{table}?{column}=eq.{value}`, exact count |

pub mod supabase;

use crate::error::StoreError;
use serde::Serialize;
use serde_json::{Map, Value};

/// A table-oriented store with upsert and equality-filtered delete.
pub trait TableStore {
    /// Fetch every row of `table`, all columns.
    async fn select_all(&self, table: &str) -> Result<Vec<Map<String, Value>>, StoreError>;

    /// Insert `rows`, overwriting existing rows that match on `on_conflict`.
    async fn upsert<T>(
        &self,
        table: &str,
        rows: &[T],
        on_conflict: &[&str],
    ) -> Result<(), StoreError>
    where
        T: Serialize;

    /// Delete every row whose `column` equals `value`, returning how many went.
    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<u64, StoreError>;
}
