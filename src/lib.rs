//! Confscout: a conference outreach discovery pipeline
//!
//! This crate discovers conferences across several listing sites, extracts
//! organizer contact details from each conference's own website, and merges
//! everything into a deduplicated record set ready for outreach export.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod outreach;
pub mod output;
pub mod pacing;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sources;
pub mod urls;

use thiserror::Error;

/// Main error type for Confscout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("No conferences found by any configured source")]
    NoResults,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown source identifier: {0}")]
    UnknownSource(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Confscout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{ConferenceContact, ConferenceRecord, ContactInfo, SourceId};
pub use report::{FailureKind, RunReport, Stage};
pub use urls::{canonicalize_url, site_key};
