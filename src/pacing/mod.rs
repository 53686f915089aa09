//! Request pacing and identity rotation
//!
//! All outbound traffic goes through the [`RateController`]: it spaces
//! requests per domain with randomized jitter (fixed intervals fingerprint a
//! bot), rotates the outbound user-agent from a configured pool, and opens a
//! per-domain circuit breaker after repeated consecutive failures. Domains
//! pace independently; there is no global lock around the network.

mod domain_state;

pub use domain_state::DomainPacing;

use crate::config::PacingConfig;
use crate::report::RunReport;
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Returned when a request is refused because the domain's breaker is open
#[derive(Debug, Error)]
#[error("domain {domain} is excluded by its circuit breaker")]
pub struct DomainExcluded {
    pub domain: String,
}

/// Clearance to issue one request, carrying the identity to present
#[derive(Debug, Clone)]
pub struct RequestPermit {
    pub user_agent: String,
}

/// Shared pacing state for one run
///
/// Keyed by site (host, plus port when explicit). Safe for concurrent use:
/// slot reservation happens under the map lock, the actual waiting does not.
pub struct RateController {
    domains: Mutex<HashMap<String, DomainPacing>>,
    user_agents: Vec<String>,
    config: PacingConfig,
}

impl RateController {
    pub fn new(config: PacingConfig, user_agents: Vec<String>) -> Self {
        debug_assert!(!user_agents.is_empty());
        Self {
            domains: Mutex::new(HashMap::new()),
            user_agents,
            config,
        }
    }

    /// Waits until it is safe to issue the next request to `domain`
    ///
    /// Suspends the caller for the domain's remaining cool-down (minimum
    /// delay plus jitter), then returns a permit with the identity to use.
    /// An excluded domain returns immediately with `DomainExcluded`.
    pub async fn acquire(&self, domain: &str) -> Result<RequestPermit, DomainExcluded> {
        let (wait, user_agent) = {
            let mut domains = self.domains.lock().await;
            let state = domains.entry(domain.to_string()).or_default();

            if state.tripped {
                return Err(DomainExcluded {
                    domain: domain.to_string(),
                });
            }

            let gap = self.jittered_gap();
            let wait = state.reserve(gap, Instant::now());
            if state.count_request(self.config.rotate_after_requests) {
                tracing::debug!("Rotating identity for {} (scheduled)", domain);
            }
            let user_agent = self.user_agent_at(state.identity_index);
            (wait, user_agent)
        };

        if wait > Duration::ZERO {
            tracing::trace!("Pacing {}: waiting {:?}", domain, wait);
            tokio::time::sleep(wait).await;
        }

        Ok(RequestPermit { user_agent })
    }

    /// Clears the failure streak after a successful fetch
    pub async fn report_success(&self, domain: &str) {
        let mut domains = self.domains.lock().await;
        if let Some(state) = domains.get_mut(domain) {
            state.record_success();
        }
    }

    /// Counts a failed fetch toward the breaker
    ///
    /// When the streak reaches the configured threshold the domain is
    /// excluded for the rest of the run and the exclusion is recorded in the
    /// report exactly once.
    pub async fn report_failure(&self, domain: &str, report: &RunReport) {
        let tripped_now = {
            let mut domains = self.domains.lock().await;
            let state = domains.entry(domain.to_string()).or_default();
            state.record_failure(self.config.failure_threshold)
        };

        if tripped_now {
            report.record_excluded_domain(domain);
        }
    }

    /// Handles a block signal: rotate the identity immediately, then count
    /// the failure toward the breaker
    pub async fn report_block(&self, domain: &str, report: &RunReport) {
        {
            let mut domains = self.domains.lock().await;
            let state = domains.entry(domain.to_string()).or_default();
            state.rotate_identity();
            tracing::debug!("Rotating identity for {} (block signal)", domain);
        }
        self.report_failure(domain, report).await;
    }

    /// Whether the domain's breaker is open
    pub async fn is_excluded(&self, domain: &str) -> bool {
        let domains = self.domains.lock().await;
        domains.get(domain).map(|s| s.tripped).unwrap_or(false)
    }

    fn jittered_gap(&self) -> Duration {
        let min = self.config.delay_min_ms;
        let max = self.config.delay_max_ms.max(min);
        let ms = if min == max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        Duration::from_millis(ms)
    }

    fn user_agent_at(&self, index: usize) -> String {
        self.user_agents[index % self.user_agents.len()].clone()
    }
}
