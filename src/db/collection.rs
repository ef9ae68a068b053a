//! Collection record operations
//!
//! Upsert and fetch of whole JSON documents by key.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::db::query::{QueryFailure, QueryService};
use crate::error::CouchbaseError;

/// A value assigned by the server to each mutation of a document.
///
/// Not unique across documents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Cas(pub u64);

impl fmt::Display for Cas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Outcome of a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    pub cas: Cas,
}

/// Outcome of a successful fetch
#[derive(Debug, Clone)]
pub struct GetResult {
    pub cas: Cas,
    content: Value,
}

impl GetResult {
    /// Decode the document body into `T`
    pub fn content_as<T: DeserializeOwned>(&self) -> Result<T, CouchbaseError> {
        T::deserialize(&self.content).map_err(|e| CouchbaseError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct CasRow {
    #[serde(default)]
    cas: Cas,
}

#[derive(Deserialize)]
struct GetRow {
    #[serde(default)]
    cas: Cas,
    content: Value,
}

/// A collection within a bucket scope, borrowed from its cluster session
pub struct Collection<'a> {
    keyspace: String,
    query: &'a QueryService,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(keyspace: String, query: &'a QueryService) -> Self {
        Self { keyspace, query }
    }

    /// Quoted SQL++ path of this collection
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Insert `value` under `key`, replacing any existing document.
    ///
    /// No CAS is supplied, so concurrent writers overwrite each other.
    pub async fn upsert<T: Serialize>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<MutationResult, CouchbaseError> {
        if key.is_empty() {
            return Err(CouchbaseError::InvalidKey);
        }

        let body = serde_json::to_value(value)?;
        let statement = format!(
            "UPSERT INTO {} (KEY, VALUE) VALUES ($1, $2) RETURNING META().cas AS cas",
            self.keyspace()
        );

        let rows = self
            .query
            .execute(&statement, vec![Value::String(key.to_string()), body])
            .await
            .map_err(|failure| map_failure(failure, key, Operation::Write))?;

        let cas = match rows.into_iter().next() {
            Some(row) => serde_json::from_value::<CasRow>(row)?.cas,
            None => Cas::default(),
        };

        tracing::debug!(key = %key, keyspace = %self.keyspace, cas = %cas, "Upserted document");

        Ok(MutationResult { cas })
    }

    /// Fetch the document stored under `key`
    pub async fn get(&self, key: &str) -> Result<GetResult, CouchbaseError> {
        if key.is_empty() {
            return Err(CouchbaseError::InvalidKey);
        }

        let statement = format!(
            "SELECT META(d).cas AS cas, d AS content FROM {} AS d USE KEYS $1",
            self.keyspace()
        );

        let rows = self
            .query
            .execute(&statement, vec![Value::String(key.to_string())])
            .await
            .map_err(|failure| map_failure(failure, key, Operation::Read))?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| CouchbaseError::DocumentNotFound {
                key: key.to_string(),
            })?;
        let row: GetRow = serde_json::from_value(row)?;

        tracing::debug!(key = %key, keyspace = %self.keyspace, cas = %row.cas, "Fetched document");

        Ok(GetResult {
            cas: row.cas,
            content: row.content,
        })
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Write,
    Read,
}

fn map_failure(failure: QueryFailure, key: &str, operation: Operation) -> CouchbaseError {
    match failure {
        QueryFailure::Transport(e) => CouchbaseError::Connection(e.to_string()),
        QueryFailure::Authentication(msg) => CouchbaseError::Authentication(msg),
        other => {
            let key = key.to_string();
            let message = other.to_string();
            match operation {
                Operation::Write => CouchbaseError::Write { key, message },
                Operation::Read => CouchbaseError::Read { key, message },
            }
        }
    }
}
