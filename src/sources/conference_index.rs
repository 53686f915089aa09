//! conferenceindex.org adapter

use crate::fetch::{PageFetcher, WaitStrategy};
use crate::record::{ConferenceRecord, SourceId};
use crate::report::{RunReport, Stage};
use crate::sources::dates::parse_date_span;
use crate::sources::{
    element_text, find_official_website, paginate, record_dropped_row, resolve_href, select_text,
    ListingQuery, SourceAdapter,
};
use crate::urls;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const DEFAULT_BASE: &str = "https://conferenceindex.org";

/// One listing row on a conferenceindex.org search page
const ROW_SELECTOR: &str = ".conference-item";

pub struct ConferenceIndex {
    base: Url,
}

impl ConferenceIndex {
    pub fn new() -> Self {
        Self::with_base(Url::parse(DEFAULT_BASE).expect("default base URL is valid"))
    }

    /// Points the adapter at a different host; used by tests
    pub fn with_base(base: Url) -> Self {
        Self { base }
    }

    fn search_url(&self, query: &ListingQuery) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("/conferences/{}", query.location_slug()));
        url.set_query(Some(&format!("keywords={}", query.keyword_query())));
        url
    }

    fn parse_row(
        &self,
        row: &ElementRef,
        page_url: &Url,
        report: &RunReport,
    ) -> Option<ConferenceRecord> {
        let title_selector = Selector::parse(".conference-title a").ok()?;
        let title_link = row.select(&title_selector).next()?;
        let name = element_text(&title_link);
        if name.is_empty() {
            tracing::debug!("Skipping listing row without a title on {}", page_url);
            return None;
        }

        let detail_url = title_link
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, page_url));
        let Some(detail_url) = detail_url else {
            tracing::debug!("Skipping '{}': no detail link", name);
            return None;
        };

        let date_text = select_text(row, ".conference-dates").unwrap_or_default();
        let Some((start, end)) = parse_date_span(&date_text) else {
            record_dropped_row(
                report,
                page_url,
                &name,
                &format!("unparsable date '{}'", date_text),
            );
            return None;
        };

        let location =
            select_text(row, ".conference-location").unwrap_or_else(|| "Unknown".to_string());
        let description = select_text(row, ".conference-description");

        Some(ConferenceRecord {
            name,
            start_date: Some(start),
            end_date: end,
            location,
            website_url: urls::canonicalize(&detail_url),
            source: SourceId::ConferenceIndex,
            description,
            contact: None,
        })
    }

    /// Replaces the detail-page URL with the conference's own website when
    /// the detail page links one
    async fn resolve_website(&self, record: &mut ConferenceRecord, fetcher: &PageFetcher) {
        let outcome = fetcher
            .fetch(
                &record.website_url,
                WaitStrategy::NetworkIdle,
                Stage::Listing,
            )
            .await;
        if let Some(page) = outcome.success() {
            let document = page.document();
            if let Some(official) = find_official_website(&document, &record.website_url) {
                record.website_url = urls::canonicalize(&official);
            }
        }
        // On failure the detail URL stands; the fetcher recorded the reason
    }
}

impl Default for ConferenceIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for ConferenceIndex {
    fn id(&self) -> SourceId {
        SourceId::ConferenceIndex
    }

    async fn list(
        &self,
        query: &ListingQuery,
        fetcher: &PageFetcher,
        report: &RunReport,
    ) -> Vec<ConferenceRecord> {
        let first = self.search_url(query);
        tracing::info!("conferenceindex: listing from {}", first);

        let mut records = paginate(
            fetcher,
            report,
            first,
            ROW_SELECTOR,
            query.max_pages,
            |document: &Html, page_url: &Url, report: &RunReport| {
                let selector = Selector::parse(ROW_SELECTOR).expect("row selector is valid");
                document
                    .select(&selector)
                    .filter_map(|row| self.parse_row(&row, page_url, report))
                    .collect()
            },
        )
        .await;

        for record in &mut records {
            self.resolve_website(record, fetcher).await;
        }

        tracing::info!("conferenceindex: {} records", records.len());
        records
    }
}
