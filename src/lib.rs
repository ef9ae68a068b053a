//! Couchbase airline upsert/fetch round trip library

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod roundtrip;

// Re-export commonly used types
pub use config::Settings;
pub use db::{Airline, Cluster};
pub use error::CouchbaseError;
