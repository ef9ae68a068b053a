//! Database module
//!
//! Contains the cluster connection, collection handles and document models.

pub mod bucket;
pub mod cluster;
pub mod collection;
pub mod models;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;

pub use bucket::{Bucket, Scope};
pub use cluster::{Cluster, ClusterOptions, SaslMechanism, SecurityConfig};
pub use collection::{Cas, Collection, GetResult, MutationResult};
pub use models::Airline;
