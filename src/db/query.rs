//! Query service transport
//!
//! Thin request/response wrapper around the cluster's SQL++ endpoint
//! (`POST /query/service`). All record operations go through here.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query service error code reported for rejected credentials
pub const AUTHENTICATION_FAILURE_CODE: u32 = 10000;

/// Path of the statement endpoint relative to the service base URL
const QUERY_PATH: &str = "/query/service";

/// Request body sent to the query service
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub statement: &'a str,

    /// Positional parameters bound to `$1`, `$2`, ...
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

/// Response envelope returned by the query service
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub results: Vec<Value>,

    #[serde(default)]
    pub errors: Vec<QueryErrorEntry>,
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, Deserialize)]
pub struct QueryErrorEntry {
    pub code: u32,
    pub msg: String,
}

/// Why a statement did not produce results.
///
/// Callers translate this into the operation-specific [`CouchbaseError`].
///
/// [`CouchbaseError`]: crate::error::CouchbaseError
#[derive(Debug)]
pub enum QueryFailure {
    /// The request never got a response
    Transport(reqwest::Error),
    /// Credentials were rejected
    Authentication(String),
    /// The service answered but refused the statement
    Rejected(String),
    /// The response body could not be understood
    Malformed(String),
}

impl std::fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryFailure::Transport(e) => write!(f, "transport failure: {}", e),
            QueryFailure::Authentication(msg) => write!(f, "authentication failure: {}", msg),
            QueryFailure::Rejected(msg) => write!(f, "{}", msg),
            QueryFailure::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

/// Authenticated handle on one query service endpoint
pub struct QueryService {
    client: Client,
    url: String,
    username: String,
    password: String,
}

impl QueryService {
    /// Create a query service handle
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client (owns the connection pool)
    /// * `endpoint` - Service base URL, e.g. `http://127.0.0.1:8093`
    /// * `username` / `password` - Credentials sent with every statement
    pub fn new(
        client: Client,
        endpoint: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: format!("{}{}", endpoint.trim_end_matches('/'), QUERY_PATH),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Full URL statements are posted to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute one statement and return its result rows
    pub async fn execute(
        &self,
        statement: &str,
        args: Vec<Value>,
    ) -> Result<Vec<Value>, QueryFailure> {
        tracing::debug!(url = %self.url, statement = %statement, "Executing statement");

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&QueryRequest { statement, args })
            .send()
            .await
            .map_err(QueryFailure::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(QueryFailure::Transport)?;
        let parsed = serde_json::from_str::<QueryResponse>(&body);

        if status == StatusCode::UNAUTHORIZED {
            let message = parsed
                .ok()
                .and_then(|r| r.errors.first().map(|e| e.msg.clone()))
                .unwrap_or_else(|| "credentials rejected".to_string());
            return Err(QueryFailure::Authentication(message));
        }

        let parsed = parsed.map_err(|e| {
            tracing::error!(status = %status, error = %e, body = %body, "Failed to parse query response");
            QueryFailure::Malformed(format!("HTTP {}: {}", status.as_u16(), e))
        })?;

        if parsed
            .errors
            .iter()
            .any(|e| e.code == AUTHENTICATION_FAILURE_CODE)
        {
            return Err(QueryFailure::Authentication(join_errors(&parsed.errors)));
        }

        if !status.is_success() || parsed.status != "success" || !parsed.errors.is_empty() {
            let message = if parsed.errors.is_empty() {
                format!("HTTP {} with status '{}'", status.as_u16(), parsed.status)
            } else {
                join_errors(&parsed.errors)
            };
            return Err(QueryFailure::Rejected(message));
        }

        Ok(parsed.results)
    }
}

fn join_errors(errors: &[QueryErrorEntry]) -> String {
    errors
        .iter()
        .map(|e| format!("[{}] {}", e.code, e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}
