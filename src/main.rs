//! Airline round trip
//!
//! Connects to a Couchbase cluster, upserts the 40-Mile Air airline
//! document and prints the copy read back from the server.

use airline_roundtrip::{config::Settings, logging, roundtrip, Airline};
use anyhow::Result;
use clap::Parser;

/// Upsert an airline document into Couchbase and read it back
#[derive(Parser, Debug)]
#[command(name = "airline-roundtrip")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Connection string, e.g. couchbase://127.0.0.1 (overrides COUCHBASE_CONNECTION_STRING)
    #[arg(long)]
    connection_string: Option<String>,

    /// Username (overrides COUCHBASE_USERNAME)
    #[arg(short, long)]
    username: Option<String>,

    /// Bucket to write into (overrides COUCHBASE_BUCKET)
    #[arg(short, long)]
    bucket: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let mut settings = Settings::load()?;

    if let Some(connection_string) = args.connection_string {
        settings.connection_string = connection_string;
    }
    if let Some(username) = args.username {
        settings.username = username;
    }
    if let Some(bucket) = args.bucket {
        settings.bucket = bucket;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    settings.validate()?;

    logging::init_tracing(&settings.log_level);

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        connection_string = %settings.connection_string,
        bucket = %settings.bucket,
        "Starting round trip"
    );

    let fetched = roundtrip::run(&settings, &Airline::forty_mile_air()).await?;

    println!("{}", roundtrip::render(&fetched));

    Ok(())
}
