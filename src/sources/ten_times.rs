//! 10times.com adapter

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

const DEFAULT_BASE: &str = "https://10times.com";

const ROW_SELECTOR: &str = ".event-list-item";

pub struct TenTimes {
    base: Url,
}

impl TenTimes {
    pub fn new() -> Self {
        Self::with_base(Url::parse(DEFAULT_BASE).expect("default base URL is valid"))
    }

    /// Points the adapter at a different host; used by tests
    pub fn with_base(base: Url) -> Self {
        Self { base }
    }

    fn search_url(&self, query: &ListingQuery) -> Url {
        let mut url = self.base.clone();
        url.set_path("/events");
        url.set_query(Some(&format!(
            "kw={}&ci={}",
            query.keyword_query(),
            query.location_slug()
        )));
        url
    }

    fn parse_row(
        &self,
        row: &ElementRef,
        page_url: &Url,
        report: &RunReport,
    ) -> Option<ConferenceRecord> {
        let title_selector = Selector::parse(".event-name a").ok()?;
        let title_link = row.select(&title_selector).next()?;
        let name = element_text(&title_link);
        if name.is_empty() {
            tracing::debug!("Skipping listing row without a title on {}", page_url);
            return None;
        }

        let detail_url = title_link
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, page_url))?;

        let date_text = select_text(row, ".event-dates").unwrap_or_default();
        let Some((start, end)) = parse_date_span(&date_text) else {
            record_dropped_row(
                report,
                page_url,
                &name,
                &format!("unparsable date '{}'", date_text),
            );
            return None;
        };

        let location = select_text(row, ".event-location").unwrap_or_else(|| "Unknown".to_string());
        let description = select_text(row, ".event-description");

        Some(ConferenceRecord {
            name,
            start_date: Some(start),
            end_date: end,
            location,
            website_url: urls::canonicalize(&detail_url),
            source: SourceId::TenTimes,
            description,
            contact: None,
        })
    }

    /// 10times marks the official site with a dedicated link class; fall
    /// back to the generic off-site scan when it is absent
    async fn resolve_website(&self, record: &mut ConferenceRecord, fetcher: &PageFetcher) {
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

        let official = Selector::parse("a.website-link[href]")
            .ok()
            .and_then(|selector| {
                document
                    .select(&selector)
                    .next()
                    .and_then(|el| el.value().attr("href"))
                    .and_then(|href| resolve_href(href, &record.website_url))
            })
            .or_else(|| find_official_website(&document, &record.website_url));

        if let Some(official) = official {
            record.website_url = urls::canonicalize(&official);
        }
    }
}

impl Default for TenTimes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for TenTimes {
    fn id(&self) -> SourceId {
        SourceId::TenTimes
    }

    async fn list(
        &self,
        query: &ListingQuery,
        fetcher: &PageFetcher,
        report: &RunReport,
    ) -> Vec<ConferenceRecord> {
        let first = self.search_url(query);
        tracing::info!("10times: listing from {}", first);

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

        tracing::info!("10times: {} records", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query() -> ListingQuery {
        ListingQuery {
            keywords: vec!["Machine Learning".to_string()],
            location: "Amsterdam".to_string(),
            start_date: None,
            end_date: None,
            max_pages: 3,
        }
    }

    fn first_row(document: &Html) -> ElementRef<'_> {
        let selector = Selector::parse(ROW_SELECTOR).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_search_url() {
        let adapter = TenTimes::new();
        let url = adapter.search_url(&query());
        assert_eq!(
            url.as_str(),
            "https://10times.com/events?kw=Machine+Learning&ci=amsterdam"
        );
    }

    #[test]
    fn test_parse_row_with_compact_date_range() {
        let adapter = TenTimes::new();
        let document = Html::parse_document(
            r#"<div class="event-list-item">
                <h2 class="event-name"><a href="/ml-forum-amsterdam">ML Forum</a></h2>
                <div class="event-dates">15-17 Jul 2025</div>
                <div class="event-location">Amsterdam, Netherlands</div>
            </div>"#,
        );
        let report = RunReport::new();
        let page_url = Url::parse("https://10times.com/events").unwrap();

        let record = adapter
            .parse_row(&first_row(&document), &page_url, &report)
            .unwrap();

        assert_eq!(record.name, "ML Forum");
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2025, 7, 15));
        assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2025, 7, 17));
        assert_eq!(record.source, SourceId::TenTimes);
        assert_eq!(
            record.website_url.as_str(),
            "https://10times.com/ml-forum-amsterdam"
        );
    }

    #[test]
    fn test_missing_date_is_recorded_drop() {
        let adapter = TenTimes::new();
        let document = Html::parse_document(
            r#"<div class="event-list-item">
                <h2 class="event-name"><a href="/mystery">Mystery Expo</a></h2>
                <div class="event-location">Oslo, Norway</div>
            </div>"#,
        );
        let report = RunReport::new();
        let page_url = Url::parse("https://10times.com/events").unwrap();

        assert!(adapter
            .parse_row(&first_row(&document), &page_url, &report)
            .is_none());
        assert_eq!(report.failure_count(), 1);
    }
}
