use chrono::NaiveDate;
use serde::Deserialize;

/// Main configuration structure for a Confscout run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    pub outreach: OutreachConfig,
    pub output: OutputConfig,
}

/// What to search for and where
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Source identifiers in precedence order (dedup tie-break order)
    pub sources: Vec<String>,

    /// Keywords matched against conference names (OR semantics)
    pub keywords: Vec<String>,

    /// Location filter; empty matches everything
    #[serde(default)]
    pub location: String,

    /// Earliest acceptable start date
    #[serde(rename = "start-date")]
    pub start_date: Option<NaiveDate>,

    /// Latest acceptable start date; open-ended when absent
    #[serde(rename = "end-date")]
    pub end_date: Option<NaiveDate>,

    /// Cap on how many candidates proceed to contact extraction
    #[serde(rename = "max-conferences", default = "default_max_conferences")]
    pub max_conferences: usize,
}

/// Per-domain request pacing and circuit breaking
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the randomized inter-request delay (milliseconds)
    #[serde(rename = "delay-min-ms", default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the randomized inter-request delay (milliseconds)
    #[serde(rename = "delay-max-ms", default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Rotate the outbound identity after this many requests to one domain
    #[serde(rename = "rotate-after-requests", default = "default_rotate_after")]
    pub rotate_after_requests: u32,

    /// Consecutive failures before a domain is excluded for the run
    #[serde(rename = "failure-threshold", default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on waiting for dynamically rendered content (seconds)
    #[serde(rename = "wait-timeout-secs", default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,

    /// Retry attempts for transient transport failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Listing pages followed per source before stopping
    #[serde(rename = "max-pages-per-source", default = "default_max_pages")]
    pub max_pages_per_source: u32,
}

/// Outbound client identity pool
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// User-agent strings rotated across requests
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

/// Worker pool sizes and the optional wall-clock budget
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Listing adapters running at once
    #[serde(rename = "listing-concurrency", default = "default_listing_concurrency")]
    pub listing_concurrency: usize,

    /// Conference websites mined for contacts at once
    #[serde(
        rename = "extraction-concurrency",
        default = "default_extraction_concurrency"
    )]
    pub extraction_concurrency: usize,

    /// Stop admitting new work after this many seconds; in-flight work drains
    #[serde(rename = "max-runtime-secs")]
    pub max_runtime_secs: Option<u64>,
}

/// Contact-page discovery and mining knobs
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Keywords that mark a link as a candidate contact page
    #[serde(rename = "contact-keywords", default = "default_contact_keywords")]
    pub contact_keywords: Vec<String>,

    /// Candidate contact pages fetched per conference website
    #[serde(rename = "max-contact-pages", default = "default_max_contact_pages")]
    pub max_contact_pages: usize,

    /// Email domains treated as placeholders and never returned
    #[serde(rename = "placeholder-domains", default = "default_placeholder_domains")]
    pub placeholder_domains: Vec<String>,
}

/// Identity of the party doing outreach, used by the message template
#[derive(Debug, Clone, Deserialize)]
pub struct OutreachConfig {
    #[serde(rename = "company-name")]
    pub company_name: String,

    #[serde(rename = "company-description", default)]
    pub company_description: String,

    #[serde(rename = "speaker-name")]
    pub speaker_name: String,

    #[serde(rename = "speaker-title", default)]
    pub speaker_title: String,
}

/// Where results land
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the exported CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

fn default_max_conferences() -> usize {
    10
}

fn default_delay_min_ms() -> u64 {
    2000
}

fn default_delay_max_ms() -> u64 {
    5000
}

fn default_rotate_after() -> u32 {
    10
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_wait_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    3
}

fn default_listing_concurrency() -> usize {
    2
}

fn default_extraction_concurrency() -> usize {
    4
}

fn default_contact_keywords() -> Vec<String> {
    [
        "contact", "about", "team", "organizer", "organiser", "committee", "staff", "speaker",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_contact_pages() -> usize {
    4
}

fn default_placeholder_domains() -> Vec<String> {
    [
        "example.com",
        "example.org",
        "example.net",
        "email.com",
        "domain.com",
        "yourdomain.com",
        "sentry.io",
        "wixpress.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            rotate_after_requests: default_rotate_after(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            wait_timeout_secs: default_wait_timeout(),
            max_retries: default_max_retries(),
            max_pages_per_source: default_max_pages(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing_concurrency: default_listing_concurrency(),
            extraction_concurrency: default_extraction_concurrency(),
            max_runtime_secs: None,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            contact_keywords: default_contact_keywords(),
            max_contact_pages: default_max_contact_pages(),
            placeholder_domains: default_placeholder_domains(),
        }
    }
}
