//! Configuration management module
//!
//! This module handles loading and validating application configuration
//! from environment variables and .env files.

pub mod connection_string;
pub mod settings;

pub use connection_string::ConnectionString;
pub use settings::Settings;
