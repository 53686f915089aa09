//! Candidate contact-page discovery
//!
//! A conference website's landing page links to the pages worth mining:
//! contact, about, team, committee. Links are scored by how specifically
//! they match the configured keywords so the most promising pages are
//! fetched first, under a hard bound.

use crate::sources::resolve_href;
use crate::urls::{self, is_offsite};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A scored candidate link
#[derive(Debug)]
struct Candidate {
    url: Url,
    score: usize,
}

/// Ranks same-site links by contact-keyword specificity
///
/// A keyword hit in a path segment counts double a hit in the link text,
/// and longer keywords outrank shorter ones ("contact" in `/contact-us`
/// beats "about" in `/about`). Links matching no keyword are never
/// returned, so they are never fetched.
pub fn rank_contact_pages(
    document: &Html,
    base: &Url,
    keywords: &[String],
    limit: usize,
) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_href(href, base) else {
            continue;
        };
        // Contact pages live on the conference's own site; a link to a
        // ticketing platform or a sponsor is not worth mining
        if is_offsite(&url, base) {
            continue;
        }

        let url = urls::canonicalize(&url);
        if url == *base || !seen.insert(url.as_str().to_string()) {
            continue;
        }

        let link_text = element.text().collect::<String>().to_lowercase();
        let path = url.path().to_lowercase();

        let score = keywords
            .iter()
            .map(|keyword| {
                let keyword = keyword.to_lowercase();
                if path.contains(&keyword) {
                    keyword.len() * 2
                } else if link_text.contains(&keyword) {
                    keyword.len()
                } else {
                    0
                }
            })
            .max()
            .unwrap_or(0);

        if score > 0 {
            candidates.push(Candidate { url, score });
        }
    }

    // Stable sort keeps document order among equal scores
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(limit);
    candidates.into_iter().map(|c| c.url).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn base() -> Url {
        Url::parse("https://aisummit.org/").unwrap()
    }

    fn page(links: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", links))
    }

    #[test]
    fn test_ranking_prefers_more_specific_keyword() {
        let document = page(
            r#"<a href="/about">About</a>
               <a href="/contact-us">Get in touch</a>
               <a href="/products">Products</a>"#,
        );

        let ranked = rank_contact_pages(&document, &base(), &keywords(&["contact", "about"]), 5);

        let paths: Vec<&str> = ranked.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/contact-us", "/about"]);
    }

    #[test]
    fn test_non_matching_links_never_returned() {
        let document = page(r#"<a href="/products">Products</a> <a href="/pricing">Pricing</a>"#);
        let ranked = rank_contact_pages(&document, &base(), &keywords(&["contact"]), 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_link_text_match_scores_lower_than_path_match() {
        let document = page(
            r#"<a href="/page-7">Contact the organizers</a>
               <a href="/contact">Info</a>"#,
        );

        let ranked = rank_contact_pages(&document, &base(), &keywords(&["contact"]), 5);

        let paths: Vec<&str> = ranked.iter().map(|u| u.path()).collect();
        assert_eq!(paths, vec!["/contact", "/page-7"]);
    }

    #[test]
    fn test_offsite_links_excluded() {
        let document = page(r#"<a href="https://tickets.example/contact">Contact</a>"#);
        let ranked = rank_contact_pages(&document, &base(), &keywords(&["contact"]), 5);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_duplicate_targets_collapse() {
        let document = page(
            r#"<a href="/contact">Contact</a>
               <a href="/contact#form">Contact form</a>"#,
        );
        let ranked = rank_contact_pages(&document, &base(), &keywords(&["contact"]), 5);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_limit_applies_after_ranking() {
        let document = page(
            r#"<a href="/about">About</a>
               <a href="/team">Team</a>
               <a href="/contact">Contact</a>"#,
        );

        let ranked = rank_contact_pages(
            &document,
            &base(),
            &keywords(&["contact", "about", "team"]),
            1,
        );

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].path(), "/contact");
    }

    #[test]
    fn test_landing_page_itself_excluded() {
        let document = page(r#"<a href="/">About this conference</a>"#);
        let ranked = rank_contact_pages(&document, &base(), &keywords(&["about"]), 5);
        assert!(ranked.is_empty());
    }
}
