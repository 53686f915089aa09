//! Candidate filtering
//!
//! Filtering runs twice: once right after listing, to bound how many
//! candidates reach the expensive contact-extraction stage, and once after
//! normalization, to catch records whose fields were corrected along the
//! way.

use crate::config::SearchConfig;
use crate::normalize::fold_location;
use crate::record::ConferenceRecord;
use chrono::NaiveDate;

/// The predicates a record must satisfy to stay in the run
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    keywords: Vec<String>,
    location: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn from_config(search: &SearchConfig) -> Self {
        let keywords = search
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let location = Some(search.location.trim().to_lowercase()).filter(|l| !l.is_empty());

        Self {
            keywords,
            location,
            start: search.start_date,
            end: search.end_date,
        }
    }

    /// Whether a record passes every configured predicate
    pub fn matches(&self, record: &ConferenceRecord) -> bool {
        self.matches_keywords(record) && self.matches_location(record) && self.matches_dates(record)
    }

    /// Keyword OR-semantics over name and description
    fn matches_keywords(&self, record: &ConferenceRecord) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let mut haystack = record.name.to_lowercase();
        if let Some(description) = &record.description {
            haystack.push(' ');
            haystack.push_str(&description.to_lowercase());
        }
        self.keywords.iter().any(|k| haystack.contains(k))
    }

    /// Substring match, with synonym folding so "UK" finds "United Kingdom"
    fn matches_location(&self, record: &ConferenceRecord) -> bool {
        let Some(wanted) = &self.location else {
            return true;
        };
        let record_location = record.location.to_lowercase();
        if record_location.contains(wanted) {
            return true;
        }
        fold_location(&record_location).contains(&fold_location(wanted))
    }

    /// Start date within `[start, end]` inclusive; an open end means no
    /// upper bound. A record without a start date fails once any bound is
    /// configured, since the predicate cannot be verified.
    fn matches_dates(&self, record: &ConferenceRecord) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(start_date) = record.start_date else {
            return false;
        };
        if let Some(start) = self.start {
            if start_date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if start_date > end {
                return false;
            }
        }
        true
    }
}

/// Keeps at most `max` records, preserving discovery order
pub fn apply_cap(mut records: Vec<ConferenceRecord>, max: usize) -> Vec<ConferenceRecord> {
    if records.len() > max {
        tracing::info!("Capping candidate set from {} to {}", records.len(), max);
        records.truncate(max);
    }
    records
}
