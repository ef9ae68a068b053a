//! Cluster connection
//!
//! Establishes an authenticated session against the cluster's query
//! service and hands out bucket handles. The session is released when the
//! [`Cluster`] is dropped or explicitly closed.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConnectionString;
use crate::db::bucket::Bucket;
use crate::db::query::{QueryFailure, QueryService};
use crate::error::CouchbaseError;

/// Statement used to verify reachability and credentials
const HANDSHAKE_STATEMENT: &str = "SELECT RAW 1";

/// SASL mechanisms a session may negotiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SaslMechanism {
    #[serde(rename = "PLAIN")]
    Plain,
    #[serde(rename = "SCRAM-SHA1")]
    ScramSha1,
    #[serde(rename = "SCRAM-SHA256")]
    ScramSha256,
    #[serde(rename = "SCRAM-SHA512")]
    ScramSha512,
}

impl fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaslMechanism::Plain => write!(f, "PLAIN"),
            SaslMechanism::ScramSha1 => write!(f, "SCRAM-SHA1"),
            SaslMechanism::ScramSha256 => write!(f, "SCRAM-SHA256"),
            SaslMechanism::ScramSha512 => write!(f, "SCRAM-SHA512"),
        }
    }
}

impl std::str::FromStr for SaslMechanism {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Ok(SaslMechanism::Plain),
            "SCRAM-SHA1" => Ok(SaslMechanism::ScramSha1),
            "SCRAM-SHA256" => Ok(SaslMechanism::ScramSha256),
            "SCRAM-SHA512" => Ok(SaslMechanism::ScramSha512),
            _ => anyhow::bail!(
                "Invalid SASL mechanism: {}. Expected: PLAIN, SCRAM-SHA1, SCRAM-SHA256, or SCRAM-SHA512",
                s
            ),
        }
    }
}

/// Security settings for the session handshake
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Mechanisms the session is allowed to negotiate, in preference order
    pub allowed_sasl_mechanisms: Vec<SaslMechanism>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_sasl_mechanisms: vec![
                SaslMechanism::ScramSha512,
                SaslMechanism::ScramSha256,
                SaslMechanism::ScramSha1,
            ],
        }
    }
}

impl SecurityConfig {
    pub fn with_allowed_sasl_mechanisms(mut self, mechanisms: Vec<SaslMechanism>) -> Self {
        self.allowed_sasl_mechanisms = mechanisms;
        self
    }
}

/// Options for [`Cluster::connect`]
#[derive(Clone)]
pub struct ClusterOptions {
    pub username: String,
    pub password: String,
    pub security: SecurityConfig,

    /// Explicit query service base URL, bypassing connection string derivation
    pub query_endpoint: Option<String>,
}

impl ClusterOptions {
    /// Create options with username/password credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security: SecurityConfig::default(),
            query_endpoint: None,
        }
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn with_query_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.query_endpoint = Some(endpoint.into());
        self
    }
}

impl fmt::Debug for ClusterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterOptions")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("security", &self.security)
            .field("query_endpoint", &self.query_endpoint)
            .finish()
    }
}

/// An authenticated session against a cluster.
///
/// Bucket, scope and collection handles borrow the session, so none of
/// them can be used once it is closed:
///
/// ```compile_fail
/// # async fn write_after_close(cluster: airline_roundtrip::Cluster) {
/// let collection = cluster.bucket("travel-sample").default_collection();
/// cluster.close();
/// let _ = collection.get("airline_10").await;
/// # }
/// ```
pub struct Cluster {
    query: QueryService,
}

impl Cluster {
    /// Connect and authenticate.
    ///
    /// Credentials travel as HTTP Basic authorization, which is the PLAIN
    /// mechanism; it must therefore be in the allow-list. A handshake
    /// statement is run so that unreachable endpoints and rejected
    /// credentials fail here rather than on the first record operation.
    ///
    /// The node must run the query service. A node that only serves the
    /// key-value port (memcached binary protocol) fails with
    /// [`CouchbaseError::Connection`].
    pub async fn connect(
        connection_string: &str,
        options: ClusterOptions,
    ) -> Result<Self, CouchbaseError> {
        let parsed = ConnectionString::parse(connection_string)?;
        let mechanism = negotiate_mechanism(&options.security)?;

        if !parsed.is_tls() && mechanism == SaslMechanism::Plain {
            tracing::warn!(
                connection_string = %connection_string,
                "PLAIN authentication over a non-TLS connection sends credentials in the clear"
            );
        }

        let endpoint = options
            .query_endpoint
            .clone()
            .unwrap_or_else(|| parsed.query_endpoint());

        let client = Client::builder().build()?;
        let query = QueryService::new(client, &endpoint, &options.username, &options.password);

        tracing::info!(
            endpoint = %endpoint,
            username = %options.username,
            mechanism = %mechanism,
            "Connecting to cluster"
        );

        query
            .execute(HANDSHAKE_STATEMENT, Vec::new())
            .await
            .map_err(|failure| match failure {
                QueryFailure::Authentication(msg) => CouchbaseError::Authentication(msg),
                other => CouchbaseError::Connection(format!(
                    "no query service at {} ({}); key-value only nodes are not supported",
                    endpoint, other
                )),
            })?;

        tracing::info!(endpoint = %endpoint, "Connected to cluster");

        Ok(Self { query })
    }

    /// Resolve a bucket handle. No network round trip is made.
    pub fn bucket(&self, name: &str) -> Bucket<'_> {
        Bucket::new(name, &self.query)
    }

    /// Release the session and its connection pool.
    pub fn close(self) {
        tracing::info!(url = %self.query.url(), "Closing cluster session");
    }
}

impl Drop for Cluster {
    fn drop(&mut self) {
        tracing::debug!(url = %self.query.url(), "Cluster session released");
    }
}

/// Pick the first allowed mechanism the HTTP transport can carry
fn negotiate_mechanism(security: &SecurityConfig) -> Result<SaslMechanism, CouchbaseError> {
    security
        .allowed_sasl_mechanisms
        .iter()
        .copied()
        .find(|m| *m == SaslMechanism::Plain)
        .ok_or_else(|| {
            let allowed = security
                .allowed_sasl_mechanisms
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            CouchbaseError::UnsupportedSaslMechanism(format!(
                "allowed [{}], but the query service transport only supports PLAIN",
                allowed
            ))
        })
}
