//! Source adapters
//!
//! One adapter per listing site, each translating that site's result pages
//! into canonical [`ConferenceRecord`]s. Adapters share no state and are
//! independent of one another; adding a source means adding a variant here,
//! never touching the orchestration.

mod conference_index;
pub mod dates;
mod eventbrite;
mod ten_times;

pub use conference_index::ConferenceIndex;
pub use eventbrite::Eventbrite;
pub use ten_times::TenTimes;

use crate::config::{Config, SearchConfig};
use crate::fetch::{PageFetcher, WaitStrategy};
use crate::record::{ConferenceRecord, SourceId};
use crate::report::{FailureKind, RunReport, Stage};
use crate::urls::is_offsite;
use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Search parameters handed to every adapter
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub keywords: Vec<String>,
    pub location: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Listing pages followed before the adapter stops paginating
    pub max_pages: u32,
}

impl ListingQuery {
    pub fn from_config(config: &Config) -> Self {
        let SearchConfig {
            keywords,
            location,
            start_date,
            end_date,
            ..
        } = &config.search;
        Self {
            keywords: keywords.clone(),
            location: location.clone(),
            start_date: *start_date,
            end_date: *end_date,
            max_pages: config.fetch.max_pages_per_source,
        }
    }

    /// Keywords joined for a query string, e.g. `AI+Machine+Learning`
    pub fn keyword_query(&self) -> String {
        self.keywords
            .iter()
            .map(|k| k.trim().replace(' ', "+"))
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Location as a URL path segment, e.g. `Europe` -> `europe`
    pub fn location_slug(&self) -> String {
        let slug = self.location.trim().to_lowercase().replace(' ', "-");
        if slug.is_empty() {
            "online".to_string()
        } else {
            slug
        }
    }
}

/// The capability every listing site adapter provides
///
/// `list` returns whatever records the site yielded before pagination ended
/// or a fetch failed; a partial result is not an error. The sequence is
/// finite and not restartable mid-run.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn id(&self) -> SourceId;

    async fn list(
        &self,
        query: &ListingQuery,
        fetcher: &PageFetcher,
        report: &RunReport,
    ) -> Vec<ConferenceRecord>;
}

/// Builds the adapter set for the configured sources, preserving order
pub fn build_adapters(sources: &[SourceId]) -> Vec<Box<dyn SourceAdapter>> {
    sources
        .iter()
        .map(|id| match id {
            SourceId::ConferenceIndex => Box::new(ConferenceIndex::new()) as Box<dyn SourceAdapter>,
            SourceId::TenTimes => Box::new(TenTimes::new()) as Box<dyn SourceAdapter>,
            SourceId::Eventbrite => Box::new(Eventbrite::new()) as Box<dyn SourceAdapter>,
        })
        .collect()
}

/// Drives pagination for one adapter
///
/// Fetches `first_url`, hands each page to `parse_page`, then follows the
/// "next" link until there is none, `max_pages` is reached, or a fetch
/// fails (which ends this adapter's contribution early).
pub(crate) async fn paginate<F>(
    fetcher: &PageFetcher,
    report: &RunReport,
    first_url: Url,
    row_selector: &str,
    max_pages: u32,
    mut parse_page: F,
) -> Vec<ConferenceRecord>
where
    F: FnMut(&Html, &Url, &RunReport) -> Vec<ConferenceRecord>,
{
    let mut records = Vec::new();
    let mut next = Some(first_url);
    let mut pages = 0;

    while let Some(url) = next.take() {
        if pages >= max_pages {
            tracing::debug!("Stopping pagination at {} pages", max_pages);
            break;
        }
        pages += 1;

        let wait = WaitStrategy::ForSelectors(vec![row_selector.to_string()]);
        let page = match fetcher.fetch(&url, wait, Stage::Listing).await.success() {
            Some(page) => page,
            // Fetch failure already recorded; whatever we have so far stands
            None => break,
        };

        let document = page.document();
        records.extend(parse_page(&document, &page.final_url, report));
        next = next_page_url(&document, &page.final_url);
    }

    records
}

/// Finds the "next page" link on a listing page
pub(crate) fn next_page_url(document: &Html, base: &Url) -> Option<Url> {
    if let Ok(selector) = Selector::parse("a[rel=\"next\"][href]") {
        if let Some(element) = document.select(&selector).next() {
            if let Some(url) = resolve_href(element.value().attr("href")?, base) {
                return Some(url);
            }
        }
    }

    let selector = Selector::parse("a[href]").ok()?;
    for element in document.select(&selector) {
        let text = element_text(&element).to_lowercase();
        if matches!(text.as_str(), "next" | "next »" | "›" | "»" | "more") {
            if let Some(url) = resolve_href(element.value().attr("href")?, base) {
                return Some(url);
            }
        }
    }
    None
}

/// Resolves an href against the page URL, keeping only http(s) results
pub(crate) fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let url = base.join(href).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url),
        _ => None,
    }
}

/// Element text with whitespace collapsed
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Selects the first matching element's collapsed text
pub(crate) fn select_text(root: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    root.select(&selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
}

/// Social and share hosts that are never a conference's own website
const SOCIAL_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "instagram.com",
    "youtube.com",
];

/// Finds the conference's official website on its listing detail page
///
/// Listing sites link the real event site somewhere on the detail page; the
/// first off-site http(s) link that is not a social profile is taken.
pub(crate) fn find_official_website(document: &Html, detail_url: &Url) -> Option<Url> {
    let selector = Selector::parse("a[href]").ok()?;
    for element in document.select(&selector) {
        let href = element.value().attr("href")?;
        let Some(url) = resolve_href(href, detail_url) else {
            continue;
        };
        if !is_offsite(&url, detail_url) {
            continue;
        }
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let is_social = SOCIAL_HOSTS
            .iter()
            .any(|s| host == *s || host.ends_with(&format!(".{}", s)));
        if !is_social {
            return Some(url);
        }
    }
    None
}

/// Records that a listing row was dropped, with the reason
pub(crate) fn record_dropped_row(report: &RunReport, url: &Url, title: &str, reason: &str) {
    report.record_failure(
        Stage::Listing,
        FailureKind::Parse,
        url.as_str(),
        &format!("dropped '{}': {}", title, reason),
    );
}
