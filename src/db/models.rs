//! Document models
//!
//! This module defines the data structures stored in the bucket.

use serde::{Deserialize, Serialize};

/// Airline document.
///
/// `key` is both a field of the stored JSON and the document key it is
/// stored under; writers always take the document key from this field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub callsign: String,
    pub country: String,
    pub iata: String,
    pub icao: String,
    pub name: String,

    /// Document type discriminator, always "airline" in travel-sample
    #[serde(rename = "type")]
    pub kind: String,

    pub key: String,
}

impl Airline {
    /// The record written by the round trip: 40-Mile Air under `airline_10`
    pub fn forty_mile_air() -> Self {
        Self {
            callsign: "MILE-AIR".to_string(),
            country: "United States".to_string(),
            iata: "Q5".to_string(),
            icao: "MLB".to_string(),
            name: "40-Mile Air".to_string(),
            kind: "airline".to_string(),
            key: "airline_10".to_string(),
        }
    }
}
