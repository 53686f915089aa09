//! Record normalization
//!
//! Sources disagree about how to spell the same fact: "UK" vs "United
//! Kingdom", stray whitespace in names, date ranges with the end before the
//! start. Normalization makes records comparable so the deduplicator and
//! the second filter pass work on equal footing.

mod dedup;

pub use dedup::{dedup_key, deduplicate};

use crate::record::ConferenceRecord;

/// Token-level synonyms folded during location comparison
const LOCATION_SYNONYMS: &[(&str, &str)] = &[
    ("uk", "united kingdom"),
    ("usa", "united states"),
    ("uae", "united arab emirates"),
    ("deutschland", "germany"),
    ("holland", "netherlands"),
];

/// Normalizes records in place
///
/// Dates are already canonical (`NaiveDate`); this pass cleans the text
/// fields and repairs obviously inverted date ranges.
pub fn normalize_records(records: &mut [ConferenceRecord]) {
    for record in records.iter_mut() {
        record.name = collapse_whitespace(&record.name);
        record.location = collapse_whitespace(record.location.trim_matches([',', ' ']));

        if let (Some(start), Some(end)) = (record.start_date, record.end_date) {
            if end < start {
                tracing::debug!(
                    "Dropping inverted end date for '{}' ({} < {})",
                    record.name,
                    end,
                    start
                );
                record.end_date = None;
            }
        }
    }
}

/// Lowercases, strips punctuation and folds place-name synonyms
///
/// "London, U.K." and "london united kingdom" fold to the same string.
pub fn fold_location(location: &str) -> String {
    location
        .to_lowercase()
        .replace('.', "")
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(fold_token)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The first folded location token, used in the dedup key
///
/// Listing sites write "Berlin" or "Berlin, Germany"; the leading token is
/// the stable part.
pub fn location_token(location: &str) -> String {
    fold_location(location)
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn fold_token(token: &str) -> &str {
    LOCATION_SYNONYMS
        .iter()
        .find(|(from, _)| *from == token)
        .map(|(_, to)| *to)
        .unwrap_or(token)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
