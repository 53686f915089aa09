use crate::config::types::{Config, FetchConfig, IdentityConfig, PacingConfig, PipelineConfig};
use crate::record::SourceId;
use crate::ConfigError;

/// Validates the entire configuration
///
/// Every check runs before the pipeline opens a single connection; an
/// invalid configuration is fatal, never a recorded pipeline failure.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search(config)?;
    validate_pacing(&config.pacing)?;
    validate_fetch(&config.fetch)?;
    validate_identity(&config.identity)?;
    validate_pipeline(&config.pipeline)?;
    validate_output(config)?;
    Ok(())
}

fn validate_search(config: &Config) -> Result<(), ConfigError> {
    let search = &config.search;

    if search.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one source must be configured".to_string(),
        ));
    }

    // Every identifier must name a known adapter
    for source in &search.sources {
        source.parse::<SourceId>()?;
    }

    if search.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "at least one non-empty keyword is required".to_string(),
        ));
    }

    if let (Some(start), Some(end)) = (search.start_date, search.end_date) {
        if end < start {
            return Err(ConfigError::InvalidDateRange(format!(
                "end-date {} is before start-date {}",
                end, start
            )));
        }
    }

    if search.max_conferences == 0 {
        return Err(ConfigError::Validation(
            "max-conferences must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_pacing(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay-min-ms ({}) must not exceed delay-max-ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.rotate_after_requests == 0 {
        return Err(ConfigError::Validation(
            "rotate-after-requests must be >= 1".to_string(),
        ));
    }

    if config.failure_threshold == 0 {
        return Err(ConfigError::Validation(
            "failure-threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetch(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.max_pages_per_source == 0 {
        return Err(ConfigError::Validation(
            "max-pages-per-source must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_identity(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() || config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "identity.user-agents must contain at least one non-empty entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_pipeline(config: &PipelineConfig) -> Result<(), ConfigError> {
    if config.listing_concurrency < 1 || config.listing_concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "listing-concurrency must be between 1 and 16, got {}",
            config.listing_concurrency
        )));
    }

    if config.extraction_concurrency < 1 || config.extraction_concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "extraction-concurrency must be between 1 and 32, got {}",
            config.extraction_concurrency
        )));
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<(), ConfigError> {
    if config.output.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "output.csv-path cannot be empty".to_string(),
        ));
    }

    if config.extract.max_contact_pages == 0 {
        return Err(ConfigError::Validation(
            "extract.max-contact-pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}
