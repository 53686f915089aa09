//! End-to-end pipeline tests
//!
//! These tests stand up mock HTTP servers for a listing site and a
//! conference website, then drive the full pipeline: listing, filtering,
//! contact extraction, dedup, message generation, export.

use chrono::NaiveDate;
use confscout::config::{
    Config, ExtractConfig, FetchConfig, IdentityConfig, OutputConfig, OutreachConfig,
    PacingConfig, PipelineConfig, SearchConfig,
};
use confscout::output::{export_csv, CSV_COLUMNS};
use confscout::pipeline::Coordinator;
use confscout::record::SourceId;
use confscout::sources::{ConferenceIndex, SourceAdapter, TenTimes};
use confscout::ScoutError;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A configuration tuned for tests: no pacing delays, tight timeouts
fn test_config(failure_threshold: u32, max_retries: u32) -> Config {
    Config {
        search: SearchConfig {
            sources: vec!["conferenceindex".to_string()],
            keywords: vec!["AI".to_string()],
            location: "Berlin".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
            max_conferences: 10,
        },
        pacing: PacingConfig {
            delay_min_ms: 0,
            delay_max_ms: 0,
            rotate_after_requests: 5,
            failure_threshold,
        },
        fetch: FetchConfig {
            request_timeout_secs: 5,
            wait_timeout_secs: 1,
            max_retries,
            max_pages_per_source: 2,
        },
        identity: IdentityConfig {
            user_agents: vec!["TestAgentA/1.0".to_string(), "TestAgentB/1.0".to_string()],
        },
        pipeline: PipelineConfig {
            listing_concurrency: 1,
            extraction_concurrency: 2,
            max_runtime_secs: None,
        },
        extract: ExtractConfig::default(),
        outreach: OutreachConfig {
            company_name: "Acme AI".to_string(),
            company_description: "applied machine learning consulting.".to_string(),
            speaker_name: "Jane Smith".to_string(),
            speaker_title: "Head of Research".to_string(),
        },
        output: OutputConfig {
            csv_path: "./test-out.csv".to_string(),
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

/// Mounts a conferenceindex-shaped listing page with the given rows
async fn mount_listing(server: &MockServer, location_slug: &str, rows: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/conferences/{}", location_slug)))
        .respond_with(html(rows))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline_extracts_contact_and_generates_message() {
    let listing = MockServer::start().await;
    let site = MockServer::start().await;

    mount_listing(
        &listing,
        "berlin",
        r#"<div class="conference-item">
            <div class="conference-title"><a href="/event/ai-summit">AI Summit</a></div>
            <div class="conference-dates">15 Jul 2025 - 17 Jul 2025</div>
            <div class="conference-location">Berlin, Germany</div>
            <div class="conference-description">Applied AI.</div>
        </div>"#,
    )
    .await;

    // The detail page links the conference's own website
    Mock::given(method("GET"))
        .and(path("/event/ai-summit"))
        .respond_with(html(&format!(
            r#"<h1>AI Summit</h1><a href="{}/">Official Website</a>"#,
            site.uri()
        )))
        .mount(&listing)
        .await;

    // Conference site: landing links a contact page and an irrelevant one
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/contact-us">Contact</a> <a href="/products">Products</a>"#,
        ))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/contact-us"))
        .respond_with(html(
            r#"<p>Jane Doe, Conference Chair: jane.doe@aisummit.org</p>
               <a href="tel:+49 30 1234567">Call us</a>
               <a href="https://www.linkedin.com/in/janedoe">LinkedIn</a>"#,
        ))
        .mount(&site)
        .await;

    // Links matching no contact keyword must never be fetched
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(html("products"))
        .expect(0)
        .mount(&site)
        .await;

    let adapter = ConferenceIndex::with_base(Url::parse(&listing.uri()).unwrap());
    let coordinator = Coordinator::with_adapters(
        test_config(5, 1),
        vec![Arc::new(adapter) as Arc<dyn SourceAdapter>],
    )
    .unwrap();

    let contacts = coordinator.run().await.unwrap();

    assert_eq!(contacts.len(), 1);
    let record = &contacts[0].record;
    assert_eq!(record.name, "AI Summit");
    assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2025, 7, 15));
    assert_eq!(record.end_date, NaiveDate::from_ymd_opt(2025, 7, 17));
    assert_eq!(record.location, "Berlin, Germany");
    assert_eq!(record.website_url.as_str(), format!("{}/", site.uri()));

    let info = record.contact.as_ref().expect("contact should be found");
    assert_eq!(info.email.as_deref(), Some("jane.doe@aisummit.org"));
    assert_eq!(info.organizer_name.as_deref(), Some("Jane Doe"));
    assert_eq!(info.organizer_role.as_deref(), Some("Conference Chair"));
    assert_eq!(info.phone.as_deref(), Some("+49 30 1234567"));
    assert_eq!(
        info.linkedin_url.as_deref(),
        Some("https://www.linkedin.com/in/janedoe")
    );

    let message = contacts[0].message.as_ref().expect("message generated");
    assert!(message.contains("AI Summit"));
    assert!(message.contains("Dear Jane Doe,"));

    // Export the final set and check the stable column contract
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("out.csv");
    export_csv(&contacts, &csv_path).unwrap();
    let exported = std::fs::read_to_string(&csv_path).unwrap();
    assert!(exported.starts_with(&CSV_COLUMNS.join(",")));
    assert!(exported.contains("jane.doe@aisummit.org"));
}

#[tokio::test]
async fn test_duplicate_conference_across_sources_merges_to_one() {
    let listing = MockServer::start().await;
    let site = MockServer::start().await;

    // conferenceindex spells it "AI Summit" in "Berlin, Germany"
    mount_listing(
        &listing,
        "berlin",
        r#"<div class="conference-item">
            <div class="conference-title"><a href="/event/ai-summit">AI Summit</a></div>
            <div class="conference-dates">15 Jul 2025</div>
            <div class="conference-location">Berlin, Germany</div>
        </div>"#,
    )
    .await;

    // 10times spells it "ai summit" in "berlin"
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(html(
            r#"<div class="event-list-item">
                <h2 class="event-name"><a href="/e/ai-summit">ai summit</a></h2>
                <div class="event-dates">15 Jul 2025</div>
                <div class="event-location">berlin</div>
            </div>"#,
        ))
        .mount(&listing)
        .await;

    // Both detail pages point at the same official site
    let official = format!(r#"<a href="{}/">Official Website</a>"#, site.uri());
    Mock::given(method("GET"))
        .and(path("/event/ai-summit"))
        .respond_with(html(&official))
        .mount(&listing)
        .await;
    Mock::given(method("GET"))
        .and(path("/e/ai-summit"))
        .respond_with(html(&format!(
            r#"<a class="website-link" href="{}/">Website</a>"#,
            site.uri()
        )))
        .mount(&listing)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<p>Write to team@aisummit.org</p>"#))
        .mount(&site)
        .await;

    let base = Url::parse(&listing.uri()).unwrap();
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(ConferenceIndex::with_base(base.clone())),
        Arc::new(TenTimes::with_base(base)),
    ];
    let coordinator = Coordinator::with_adapters(test_config(5, 1), adapters).unwrap();

    let contacts = coordinator.run().await.unwrap();

    // One record survives, with the contact either source found
    assert_eq!(contacts.len(), 1);
    let record = &contacts[0].record;
    assert_eq!(
        record.contact.as_ref().unwrap().email.as_deref(),
        Some("team@aisummit.org")
    );
    // Equal richness: the tie breaks to the first configured source
    assert_eq!(record.source, SourceId::ConferenceIndex);
}

#[tokio::test]
async fn test_records_outside_date_range_are_filtered_out() {
    let listing = MockServer::start().await;

    mount_listing(
        &listing,
        "berlin",
        r#"<div class="conference-item">
            <div class="conference-title"><a href="/event/in-range">AI Days</a></div>
            <div class="conference-dates">15 Jul 2025</div>
            <div class="conference-location">Berlin, Germany</div>
        </div>
        <div class="conference-item">
            <div class="conference-title"><a href="/event/too-late">AI Nights</a></div>
            <div class="conference-dates">15 Jul 2026</div>
            <div class="conference-location">Berlin, Germany</div>
        </div>"#,
    )
    .await;

    // Detail pages carry no off-site link; the detail URL stands
    Mock::given(method("GET"))
        .respond_with(html("<p>details</p>"))
        .mount(&listing)
        .await;

    let adapter = ConferenceIndex::with_base(Url::parse(&listing.uri()).unwrap());
    let coordinator = Coordinator::with_adapters(
        test_config(5, 1),
        vec![Arc::new(adapter) as Arc<dyn SourceAdapter>],
    )
    .unwrap();

    let contacts = coordinator.run().await.unwrap();

    assert_eq!(contacts.len(), 1);
    let start = contacts[0].record.start_date.unwrap();
    assert!(start >= NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert!(start <= NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    assert_eq!(contacts[0].record.name, "AI Days");
}

#[tokio::test]
async fn test_persistent_failures_trip_breaker_and_record_once() {
    let listing = MockServer::start().await;

    // Every request to this site fails
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&listing)
        .await;

    let base = Url::parse(&listing.uri()).unwrap();
    // Two adapters against the same broken site: the second fetch pushes
    // the domain past the threshold of 2
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(ConferenceIndex::with_base(base.clone())),
        Arc::new(TenTimes::with_base(base)),
    ];
    let coordinator = Coordinator::with_adapters(test_config(2, 0), adapters).unwrap();
    let report = coordinator.report();

    let result = coordinator.run().await;

    // Nothing listed anywhere: fatal
    assert!(matches!(result, Err(ScoutError::NoResults)));
    // The exclusion is recorded exactly once, not once per skipped attempt
    assert_eq!(report.excluded_domains().len(), 1);
}

#[tokio::test]
async fn test_listing_failure_on_one_source_keeps_partial_results() {
    let listing = MockServer::start().await;

    // conferenceindex works
    mount_listing(
        &listing,
        "berlin",
        r#"<div class="conference-item">
            <div class="conference-title"><a href="/event/ai-days">AI Days</a></div>
            <div class="conference-dates">15 Jul 2025</div>
            <div class="conference-location">Berlin, Germany</div>
        </div>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/event/ai-days"))
        .respond_with(html("<p>details</p>"))
        .mount(&listing)
        .await;

    // 10times' listing endpoint is broken
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&listing)
        .await;

    let base = Url::parse(&listing.uri()).unwrap();
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(ConferenceIndex::with_base(base.clone())),
        Arc::new(TenTimes::with_base(base)),
    ];
    let coordinator = Coordinator::with_adapters(test_config(10, 0), adapters).unwrap();
    let report = coordinator.report();

    let contacts = coordinator.run().await.unwrap();

    // The healthy source's records survive; the broken one was recorded
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].record.name, "AI Days");
    assert!(report.failure_count() >= 1);
}
