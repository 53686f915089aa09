//! Contact extraction
//!
//! Given a conference's own website, find who organizes it and how to reach
//! them. Extraction is best-effort end to end: a site that cannot be
//! reached or parsed yields an empty [`ContactInfo`], never a failed run.

mod candidates;
mod patterns;

pub use candidates::rank_contact_pages;
pub use patterns::{find_role, is_usable_email, TextPatterns, ROLE_KEYWORDS};

use crate::config::ExtractConfig;
use crate::fetch::{PageFetcher, WaitStrategy};
use crate::record::ContactInfo;
use crate::report::Stage;
use scraper::{Html, Selector};
use url::Url;

/// Elements whose text forms a mining block; the smallest block containing
/// an email is treated as its context
const BLOCK_SELECTOR: &str = "p, li, td, h1, h2, h3, h4, h5, address, figcaption, div";

/// Blocks longer than this are page-level containers, not per-person
/// context
const MAX_BLOCK_CHARS: usize = 400;

pub struct ContactExtractor {
    keywords: Vec<String>,
    max_pages: usize,
    placeholder_domains: Vec<String>,
    patterns: TextPatterns,
}

impl ContactExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            keywords: config
                .contact_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            max_pages: config.max_contact_pages,
            placeholder_domains: config.placeholder_domains.clone(),
            patterns: TextPatterns::new(),
        }
    }

    /// Mines a conference website for organizer contact details
    ///
    /// Fetches the landing page, ranks its links for likely contact pages,
    /// then mines the top candidates one at a time (per-domain pacing makes
    /// parallel fetches within one site pointless). Findings merge
    /// field-wise in page-rank order: the first non-empty value per field
    /// wins, with the landing page itself mined last.
    pub async fn extract(&self, website_url: &Url, fetcher: &PageFetcher) -> ContactInfo {
        let outcome = fetcher
            .fetch(website_url, WaitStrategy::NetworkIdle, Stage::Extraction)
            .await;
        let Some(landing) = outcome.success() else {
            // Failure already recorded by the fetcher
            return ContactInfo::default();
        };

        // The parsed document is not Send, so it must not live across the
        // candidate fetches below; parse, rank, drop
        let candidates = {
            let landing_document = landing.document();
            rank_contact_pages(
                &landing_document,
                &landing.final_url,
                &self.keywords,
                self.max_pages,
            )
        };
        tracing::debug!(
            "{}: {} candidate contact pages",
            website_url,
            candidates.len()
        );

        let mut info = ContactInfo::default();
        for candidate in candidates {
            if is_complete(&info) {
                break;
            }
            let outcome = fetcher
                .fetch(&candidate, WaitStrategy::Immediate, Stage::Extraction)
                .await;
            if let Some(page) = outcome.success() {
                info.fill_missing_from(&self.mine_document(&page.document()));
            }
        }

        if !is_complete(&info) {
            info.fill_missing_from(&self.mine_document(&landing.document()));
        }

        if info.is_empty() {
            tracing::info!("No contact details found on {}", website_url);
        }
        info
    }

    /// Mines one parsed page for every contact field
    pub fn mine_document(&self, document: &Html) -> ContactInfo {
        let full_text = page_text(document);
        let blocks = text_blocks(document);

        let emails = self.collect_emails(document, &full_text);
        let (email, organizer_name, organizer_role) = self.associate(&emails, &blocks);

        let phone = self
            .phone_from_links(document)
            .or_else(|| self.patterns.phone(&full_text));

        let linkedin_url = linkedin_link(document);

        ContactInfo {
            organizer_name,
            organizer_role,
            email,
            phone,
            linkedin_url,
        }
    }

    /// Emails from page text (document order) plus mailto links, filtered
    /// down to usable addresses
    fn collect_emails(&self, document: &Html, full_text: &str) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();

        for found in self.patterns.emails(full_text) {
            if is_usable_email(found, &self.placeholder_domains)
                && !emails.iter().any(|e| e == found)
            {
                emails.push(found.to_string());
            }
        }

        if let Ok(selector) = Selector::parse(r#"a[href^="mailto:"]"#) {
            for element in document.select(&selector) {
                if let Some(href) = element.value().attr("href") {
                    let address = href
                        .trim_start_matches("mailto:")
                        .split('?')
                        .next()
                        .unwrap_or_default()
                        .trim();
                    if is_usable_email(address, &self.placeholder_domains)
                        && !emails.iter().any(|e| e == address)
                    {
                        emails.push(address.to_string());
                    }
                }
            }
        }

        emails
    }

    /// Picks the email to keep and associates a nearby name and role
    ///
    /// The email whose surrounding block mentions an organizer role wins;
    /// otherwise the first email encountered. Name and role come from that
    /// same block, and stay empty without a confident match rather than a guess.
    fn associate(
        &self,
        emails: &[String],
        blocks: &[String],
    ) -> (Option<String>, Option<String>, Option<String>) {
        let mut chosen: Option<(&String, Option<&String>)> = None;

        for email in emails {
            let block = smallest_block_containing(blocks, email);
            let has_role = block.map(|b| find_role(b).is_some()).unwrap_or(false);
            if has_role {
                chosen = Some((email, block));
                break;
            }
            if chosen.is_none() {
                chosen = Some((email, block));
            }
        }

        let Some((email, block)) = chosen else {
            return (None, None, None);
        };

        let (name, role) = match block {
            Some(block) => {
                let context = block.replace(email, " ");
                (self.patterns.name(&context), find_role(&context))
            }
            None => (None, None),
        };

        (Some(email.clone()), name, role)
    }

    fn phone_from_links(&self, document: &Html) -> Option<String> {
        let selector = Selector::parse(r#"a[href^="tel:"]"#).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| href.trim_start_matches("tel:").trim().to_string())
            .find(|number| number.chars().filter(|c| c.is_ascii_digit()).count() >= 7)
    }
}

/// True once the associated cluster (email + name + role) is filled; the
/// remaining fields are nice-to-haves that do not justify more fetches
fn is_complete(info: &ContactInfo) -> bool {
    info.email.is_some() && info.organizer_name.is_some() && info.organizer_role.is_some()
}

/// Whole-page text with element boundaries turned into spaces
fn page_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-element text blocks small enough to act as a person's context
fn text_blocks(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(BLOCK_SELECTOR) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty() && text.len() <= MAX_BLOCK_CHARS)
        .collect()
}

/// The most specific (shortest) block mentioning `needle`
fn smallest_block_containing<'b>(blocks: &'b [String], needle: &str) -> Option<&'b String> {
    blocks
        .iter()
        .filter(|block| block.contains(needle))
        .min_by_key(|block| block.len())
}

/// First link into a LinkedIn profile or company page
fn linkedin_link(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"a[href*="linkedin.com"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .next()
}
