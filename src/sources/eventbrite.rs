//! eventbrite.com adapter

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

const DEFAULT_BASE: &str = "https://www.eventbrite.com";

const ROW_SELECTOR: &str = ".search-event-card-wrapper";

pub struct Eventbrite {
    base: Url,
}

impl Eventbrite {
    pub fn new() -> Self {
        Self::with_base(Url::parse(DEFAULT_BASE).expect("default base URL is valid"))
    }

    /// Points the adapter at a different host; used by tests
    pub fn with_base(base: Url) -> Self {
        Self { base }
    }

    fn search_url(&self, query: &ListingQuery) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("/d/{}/conferences/", query.location_slug()));

        let mut params = format!("q={}", query.keyword_query());
        if let Some(start) = query.start_date {
            params.push_str(&format!("&start_date={}", start));
        }
        if let Some(end) = query.end_date {
            params.push_str(&format!("&end_date={}", end));
        }
        url.set_query(Some(&params));
        url
    }

    fn parse_row(
        &self,
        row: &ElementRef,
        page_url: &Url,
        report: &RunReport,
    ) -> Option<ConferenceRecord> {
        let name = select_text(row, ".event-card__title")?;

        let link_selector = Selector::parse("a.event-card-link[href]").ok()?;
        let detail_url = row
            .select(&link_selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| resolve_href(href, page_url))?;

        let date_text = select_text(row, ".event-card__date").unwrap_or_default();
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
            select_text(row, ".event-card__location").unwrap_or_else(|| "Unknown".to_string());

        Some(ConferenceRecord {
            name,
            start_date: Some(start),
            end_date: end,
            location,
            website_url: urls::canonicalize(&detail_url),
            source: SourceId::Eventbrite,
            // The card carries no description; the detail page does
            description: None,
            contact: None,
        })
    }

    /// Pulls the description and the official website from the detail page
    async fn enrich_from_detail(&self, record: &mut ConferenceRecord, fetcher: &PageFetcher) {
        let outcome = fetcher
            .fetch(
                &record.website_url,
                WaitStrategy::NetworkIdle,
                Stage::Listing,
            )
            .await;
        let Some(page) = outcome.success() else {
            return;
        };
        let document = page.document();

        if record.description.is_none() {
            if let Ok(selector) = Selector::parse(".event-details__description") {
                record.description = document
                    .select(&selector)
                    .next()
                    .map(|el| element_text(&el))
                    .filter(|t| !t.is_empty());
            }
        }

        if let Some(official) = find_official_website(&document, &record.website_url) {
            record.website_url = urls::canonicalize(&official);
        }
    }
}

impl Default for Eventbrite {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for Eventbrite {
    fn id(&self) -> SourceId {
        SourceId::Eventbrite
    }

    async fn list(
        &self,
        query: &ListingQuery,
        fetcher: &PageFetcher,
        report: &RunReport,
    ) -> Vec<ConferenceRecord> {
        let first = self.search_url(query);
        tracing::info!("eventbrite: listing from {}", first);

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
            self.enrich_from_detail(record, fetcher).await;
        }

        tracing::info!("eventbrite: {} records", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query() -> ListingQuery {
        ListingQuery {
            keywords: vec!["AI".to_string()],
            location: "Europe".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            max_pages: 3,
        }
    }

    fn first_row(document: &Html) -> ElementRef<'_> {
        let selector = Selector::parse(ROW_SELECTOR).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_search_url_includes_date_range() {
        let adapter = Eventbrite::new();
        let url = adapter.search_url(&query());
        assert_eq!(
            url.as_str(),
            "https://www.eventbrite.com/d/europe/conferences/?q=AI&start_date=2025-06-01&end_date=2025-12-31"
        );
    }

    #[test]
    fn test_search_url_open_ended_range() {
        let adapter = Eventbrite::new();
        let mut q = query();
        q.end_date = None;
        let url = adapter.search_url(&q);
        assert!(url.as_str().contains("start_date=2025-06-01"));
        assert!(!url.as_str().contains("end_date"));
    }

    #[test]
    fn test_parse_row_with_month_first_range() {
        let adapter = Eventbrite::new();
        let document = Html::parse_document(
            r#"<div class="search-event-card-wrapper">
                <div class="event-card__title">AI Builders Conference</div>
                <div class="event-card__date">Jul 15 - Jul 17, 2025</div>
                <div class="event-card__location">Lisbon, Portugal</div>
                <a class="event-card-link" href="/e/ai-builders-tickets-123"></a>
            </div>"#,
        );
        let report = RunReport::new();
        let page_url = Url::parse("https://www.eventbrite.com/d/europe/conferences/").unwrap();

        let record = adapter
            .parse_row(&first_row(&document), &page_url, &report)
            .unwrap();

        assert_eq!(record.name, "AI Builders Conference");
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2025, 7, 15));
        assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2025, 7, 17));
        assert_eq!(record.location, "Lisbon, Portugal");
        // www. is stripped during canonicalization
        assert_eq!(
            record.website_url.as_str(),
            "https://eventbrite.com/e/ai-builders-tickets-123"
        );
    }

    #[test]
    fn test_row_without_title_is_skipped() {
        let adapter = Eventbrite::new();
        let document = Html::parse_document(
            r#"<div class="search-event-card-wrapper">
                <a class="event-card-link" href="/e/untitled-456"></a>
            </div>"#,
        );
        let report = RunReport::new();
        let page_url = Url::parse("https://www.eventbrite.com/d/europe/conferences/").unwrap();

        assert!(adapter
            .parse_row(&first_row(&document), &page_url, &report)
            .is_none());
    }
}
