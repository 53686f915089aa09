//! Run diagnostics
//!
//! Failures local to one page or record never abort a run; they are recorded
//! here with enough context (stage, URL, reason) for post-run diagnosis.

use std::fmt;
use std::sync::Mutex;

/// Non-fatal failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Network error or timeout; retried up to the bound, then recorded
    Transport,
    /// Unexpected page structure or unparsable field; never retried
    Parse,
    /// Anti-bot signal; triggers identity rotation and circuit breaking
    Blocked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// Pipeline stage a failure was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Listing,
    Extraction,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Listing => "listing",
            Self::Extraction => "extraction",
            Self::Generation => "generation",
        };
        f.write_str(s)
    }
}

/// One recorded non-fatal failure
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub stage: Stage,
    pub kind: FailureKind,
    pub url: String,
    pub reason: String,
}

/// Collects everything that went wrong (non-fatally) during one run
///
/// Shared across worker tasks; the locks are only held for a push or a
/// clone, never across an await point. State is per-run and discarded with
/// the report.
#[derive(Debug, Default)]
pub struct RunReport {
    failures: Mutex<Vec<FailureRecord>>,
    excluded_domains: Mutex<Vec<String>>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a non-fatal failure
    pub fn record_failure(&self, stage: Stage, kind: FailureKind, url: &str, reason: &str) {
        tracing::debug!("{} failure at {} ({}): {}", kind, url, stage, reason);
        self.failures.lock().unwrap().push(FailureRecord {
            stage,
            kind,
            url: url.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Records that a domain's circuit breaker tripped
    ///
    /// Called exactly once per domain by the rate controller, at the moment
    /// the breaker opens; later skipped requests are not re-recorded.
    pub fn record_excluded_domain(&self, domain: &str) {
        tracing::warn!("Domain {} excluded for the rest of the run", domain);
        self.excluded_domains
            .lock()
            .unwrap()
            .push(domain.to_string());
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        self.failures.lock().unwrap().clone()
    }

    pub fn excluded_domains(&self) -> Vec<String> {
        self.excluded_domains.lock().unwrap().clone()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.lock().unwrap().len()
    }

    /// Failure count for one kind, for summary output
    pub fn count_by_kind(&self, kind: FailureKind) -> usize {
        self.failures
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.kind == kind)
            .count()
    }
}
