//! The upsert-then-fetch round trip
//!
//! connect → resolve collection → upsert → get → decode. Any failure aborts
//! the whole run; the cluster session is released on every exit path
//! because `run` owns it.

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::db::{Airline, Cluster};

/// Write `airline` and read it back, returning the fetched copy
pub async fn run(settings: &Settings, airline: &Airline) -> Result<Airline> {
    let cluster = Cluster::connect(&settings.connection_string, settings.cluster_options())
        .await
        .with_context(|| format!("failed to connect to {}", settings.connection_string))?;

    let collection = cluster
        .bucket(&settings.bucket)
        .scope(&settings.scope)
        .collection(&settings.collection);

    let mutation = collection
        .upsert(&airline.key, airline)
        .await
        .with_context(|| format!("failed to upsert {}", airline.key))?;

    tracing::info!(key = %airline.key, cas = %mutation.cas, "Document written");

    let fetched: Airline = collection
        .get(&airline.key)
        .await
        .with_context(|| format!("failed to get {}", airline.key))?
        .content_as()
        .with_context(|| format!("failed to decode {}", airline.key))?;

    tracing::info!(key = %fetched.key, "Document read back");

    cluster.close();

    Ok(fetched)
}

/// Structural rendering of a fetched document
pub fn render(airline: &Airline) -> String {
    format!("{:?}", airline)
}
