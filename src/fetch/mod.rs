//! Page fetching
//!
//! One shared abstraction over "load a URL and return reachable content",
//! used by the source adapters and the contact extractor alike. Every
//! attempt passes through the rate controller first; failures come back as
//! typed values, never as panics or errors in the caller's control flow.

use crate::config::FetchConfig;
use crate::pacing::RateController;
use crate::report::{FailureKind, RunReport, Stage};
use crate::urls::site_key;
use rand::Rng;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// How long to let a page settle before giving up on dynamic content
///
/// Listing sites frequently render results client-side. Without a browser
/// engine the fetcher approximates waiting by re-polling the URL until the
/// expected content shows up or the bounded wait expires.
#[derive(Debug, Clone)]
pub enum WaitStrategy {
    /// Return the first response body as-is
    Immediate,
    /// Wait for dynamic activity to settle; without a browser engine this
    /// collapses to a single fetch, but the variant keeps the contract open
    /// for a browser-backed fetcher behind the same seam
    NetworkIdle,
    /// Re-poll until one of these CSS selectors matches, within the bound
    ForSelectors(Vec<String>),
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct PageContent {
    pub final_url: Url,
    pub status: u16,
    pub body: String,
}

impl PageContent {
    /// Parses the body; malformed HTML still yields a best-effort tree
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// A fetch that did not produce usable content
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub url: String,
    pub kind: FailureKind,
    pub reason: String,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    Success(PageContent),
    Failure(FetchFailure),
}

impl FetchOutcome {
    pub fn success(self) -> Option<PageContent> {
        match self {
            Self::Success(page) => Some(page),
            Self::Failure(_) => None,
        }
    }
}

/// Body fragments that signal an anti-bot challenge despite a 200-range
/// status
const BLOCK_MARKERS: &[&str] = &[
    "captcha",
    "access denied",
    "unusual traffic",
    "verify you are human",
];

/// Delay between polls while waiting for a selector
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Base delay for retry backoff
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Builds the shared HTTP client
///
/// The user agent is deliberately not set here: the rate controller hands
/// out a per-request identity with each permit.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages through the rate controller, with bounded retries
pub struct PageFetcher {
    client: Client,
    controller: Arc<RateController>,
    config: FetchConfig,
    report: Arc<RunReport>,
}

/// Classification of one request attempt, before retry policy is applied
enum Attempt {
    Ok(PageContent),
    Blocked(String),
    Retryable(String),
    Fatal(String),
}

impl PageFetcher {
    pub fn new(
        config: FetchConfig,
        controller: Arc<RateController>,
        report: Arc<RunReport>,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        Ok(Self {
            client,
            controller,
            config,
            report,
        })
    }

    /// Fetches `url`, honoring the wait strategy and retry bounds
    ///
    /// Transport errors retry up to the configured bound with jittered
    /// exponential backoff. Block signals rotate the outbound identity and
    /// count toward the domain's circuit breaker; an open breaker turns the
    /// fetch into an immediate, unrecorded failure (the exclusion itself was
    /// recorded when the breaker tripped).
    pub async fn fetch(&self, url: &Url, wait: WaitStrategy, stage: Stage) -> FetchOutcome {
        let domain = match site_key(url) {
            Some(domain) => domain,
            None => {
                return FetchOutcome::Failure(FetchFailure {
                    url: url.to_string(),
                    kind: FailureKind::Parse,
                    reason: "URL has no host".to_string(),
                });
            }
        };

        let deadline = Instant::now() + Duration::from_secs(self.config.wait_timeout_secs);
        let mut attempt = 0u32;

        loop {
            let permit = match self.controller.acquire(&domain).await {
                Ok(permit) => permit,
                Err(excluded) => {
                    // Not re-recorded: the exclusion was reported once when
                    // the breaker tripped.
                    return FetchOutcome::Failure(FetchFailure {
                        url: url.to_string(),
                        kind: FailureKind::Blocked,
                        reason: excluded.to_string(),
                    });
                }
            };

            match self.attempt(url, &permit.user_agent).await {
                Attempt::Ok(page) => {
                    if let WaitStrategy::ForSelectors(selectors) = &wait {
                        if !page_matches_any(&page, selectors) {
                            if Instant::now() < deadline {
                                tracing::trace!("Content not ready at {}, polling again", url);
                                tokio::time::sleep(POLL_INTERVAL).await;
                                continue;
                            }
                            // The site answered but the expected content
                            // never rendered within the bound; neutral for
                            // the circuit breaker.
                            return self.fail(
                                stage,
                                url,
                                FailureKind::Transport,
                                "timed out waiting for content to render",
                            );
                        }
                    }
                    self.controller.report_success(&domain).await;
                    return FetchOutcome::Success(page);
                }

                Attempt::Blocked(reason) => {
                    tracing::warn!("Block signal from {}: {}", url, reason);
                    self.controller.report_block(&domain, &self.report).await;
                    if attempt < self.config.max_retries {
                        attempt += 1;
                        self.backoff(attempt).await;
                        continue;
                    }
                    return self.fail(stage, url, FailureKind::Blocked, &reason);
                }

                Attempt::Retryable(reason) => {
                    if attempt < self.config.max_retries {
                        attempt += 1;
                        tracing::debug!(
                            "Transient failure at {} (attempt {}): {}",
                            url,
                            attempt,
                            reason
                        );
                        self.backoff(attempt).await;
                        continue;
                    }
                    self.controller.report_failure(&domain, &self.report).await;
                    return self.fail(stage, url, FailureKind::Transport, &reason);
                }

                Attempt::Fatal(reason) => {
                    self.controller.report_failure(&domain, &self.report).await;
                    return self.fail(stage, url, FailureKind::Transport, &reason);
                }
            }
        }
    }

    /// Issues one GET and classifies the result
    async fn attempt(&self, url: &Url, user_agent: &str) -> Attempt {
        let response = match self
            .client
            .get(url.clone())
            .header(USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return if e.is_timeout() {
                    Attempt::Retryable("request timeout".to_string())
                } else if e.is_connect() {
                    Attempt::Fatal("connection refused".to_string())
                } else {
                    Attempt::Retryable(e.to_string())
                };
            }
        };

        let status = response.status();
        let final_url = response.url().clone();

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
            return Attempt::Blocked(format!("HTTP {}", status.as_u16()));
        }

        if status.is_server_error() {
            return Attempt::Retryable(format!("HTTP {}", status.as_u16()));
        }

        if !status.is_success() {
            return Attempt::Fatal(format!("HTTP {}", status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retryable(format!("body read failed: {}", e)),
        };

        if let Some(marker) = block_marker(&body) {
            return Attempt::Blocked(format!("challenge page ({})", marker));
        }

        Attempt::Ok(PageContent {
            final_url,
            status: status.as_u16(),
            body,
        })
    }

    fn fail(&self, stage: Stage, url: &Url, kind: FailureKind, reason: &str) -> FetchOutcome {
        self.report
            .record_failure(stage, kind, url.as_str(), reason);
        FetchOutcome::Failure(FetchFailure {
            url: url.to_string(),
            kind,
            reason: reason.to_string(),
        })
    }

    async fn backoff(&self, attempt: u32) {
        let base = BACKOFF_BASE * 2u32.saturating_pow(attempt.saturating_sub(1));
        let jitter = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 2);
        tokio::time::sleep(base + Duration::from_millis(jitter)).await;
    }
}

/// True when the parsed page matches any of the given CSS selectors
fn page_matches_any(page: &PageContent, selectors: &[String]) -> bool {
    let document = page.document();
    selectors.iter().any(|raw| {
        Selector::parse(raw)
            .map(|sel| document.select(&sel).next().is_some())
            .unwrap_or(false)
    })
}

/// Scans a body for anti-bot challenge markers
fn block_marker(body: &str) -> Option<&'static str> {
    // Only scan the head of the document: challenge pages are small, and
    // a legitimate page may well mention "captcha" in article text
    let head: String = body.chars().take(4096).collect::<String>().to_lowercase();
    BLOCK_MARKERS.iter().find(|m| head.contains(**m)).copied()
}
