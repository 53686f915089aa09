//! Run configuration for Confscout
//!
//! A run is described by a single TOML file: what to search for, how hard
//! the pipeline may lean on any one domain, the outbound identity pool, and
//! where results land. Everything is validated before the first request.
//!
//! # Example
//!
//! ```no_run
//! use confscout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("confscout.toml")).unwrap();
//! println!("Searching {} sources", config.search.sources.len());
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    Config, ExtractConfig, FetchConfig, IdentityConfig, OutputConfig, OutreachConfig,
    PacingConfig, PipelineConfig, SearchConfig,
};
