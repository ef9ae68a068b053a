//! Application settings and configuration
//!
//! This module provides configuration management for the round trip,
//! loading settings from environment variables with defaults that target
//! a local single-node cluster with the travel-sample bucket installed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

use crate::db::{ClusterOptions, SaslMechanism, SecurityConfig};

/// Main application settings
#[derive(Clone, Deserialize, Serialize)]
pub struct Settings {
    // App settings
    pub app_name: String,
    pub app_version: String,
    pub log_level: String,

    // Connection settings
    pub connection_string: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub sasl_mechanisms: Vec<SaslMechanism>,

    /// Explicit query service base URL (e.g. http://127.0.0.1:8093).
    /// Takes precedence over the endpoint derived from the connection string.
    pub query_endpoint: Option<String>,

    // Storage addressing
    pub bucket: String,
    pub scope: String,
    pub collection: String,
}

impl Settings {
    /// Load settings from environment variables with defaults
    ///
    /// Not validated here; callers validate after applying CLI overrides.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let settings = Self {
            app_name: env_or_default("APP_NAME", "airline-roundtrip"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: env_or_default("LOG_LEVEL", "warn"),

            connection_string: env_or_default(
                "COUCHBASE_CONNECTION_STRING",
                "couchbase://127.0.0.1",
            ),
            username: env_or_default("COUCHBASE_USERNAME", "Administrator"),
            password: env_or_default("COUCHBASE_PASSWORD", "password"),
            sasl_mechanisms: parse_sasl_mechanisms(&env_or_default(
                "COUCHBASE_SASL_MECHANISMS",
                "PLAIN",
            ))
            .context("Invalid COUCHBASE_SASL_MECHANISMS value")?,
            query_endpoint: env::var("COUCHBASE_QUERY_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            bucket: env_or_default("COUCHBASE_BUCKET", "travel-sample"),
            scope: env_or_default("COUCHBASE_SCOPE", "_default"),
            collection: env_or_default("COUCHBASE_COLLECTION", "_default"),
        };

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            anyhow::bail!("Bucket name cannot be empty");
        }
        if self.username.trim().is_empty() {
            anyhow::bail!("Username cannot be empty");
        }
        if self.sasl_mechanisms.is_empty() {
            anyhow::bail!("At least one SASL mechanism must be allowed");
        }
        if self.scope.trim().is_empty() || self.collection.trim().is_empty() {
            anyhow::bail!("Scope and collection names cannot be empty");
        }

        Ok(())
    }

    /// Build the connector options from these settings
    pub fn cluster_options(&self) -> ClusterOptions {
        let mut options = ClusterOptions::new(&self.username, &self.password).with_security(
            SecurityConfig::default().with_allowed_sasl_mechanisms(self.sasl_mechanisms.clone()),
        );
        if let Some(endpoint) = &self.query_endpoint {
            options = options.with_query_endpoint(endpoint);
        }
        options
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "airline-roundtrip".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "warn".to_string(),
            connection_string: "couchbase://127.0.0.1".to_string(),
            username: "Administrator".to_string(),
            password: "password".to_string(),
            sasl_mechanisms: vec![SaslMechanism::Plain],
            query_endpoint: None,
            bucket: "travel-sample".to_string(),
            scope: "_default".to_string(),
            collection: "_default".to_string(),
        }
    }
}

// Password stays out of Debug output so settings can be logged safely
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field("log_level", &self.log_level)
            .field("connection_string", &self.connection_string)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sasl_mechanisms", &self.sasl_mechanisms)
            .field("query_endpoint", &self.query_endpoint)
            .field("bucket", &self.bucket)
            .field("scope", &self.scope)
            .field("collection", &self.collection)
            .finish()
    }
}

/// Parse a comma-separated list of SASL mechanism names
pub fn parse_sasl_mechanisms(value: &str) -> Result<Vec<SaslMechanism>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<SaslMechanism>())
        .collect()
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
