//! Cross-source deduplication
//!
//! The same conference shows up on several listing sites with slightly
//! different spellings. Records are grouped by a derived key and merged so
//! that exactly one survives per real-world conference.

use crate::normalize::location_token;
use crate::record::{ConferenceRecord, SourceId};
use std::collections::HashMap;

/// Derives the identity key for a record
///
/// Normalized lowercase name + ISO start date + leading location token:
/// "AI Summit" in "Berlin, Germany" and "ai summit" in "berlin" on the same
/// date share a key.
pub fn dedup_key(record: &ConferenceRecord) -> String {
    let name = record
        .name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let date = record
        .start_date
        .map(|d| d.to_string())
        .unwrap_or_default();
    format!("{}|{}|{}", name, date, location_token(&record.location))
}

/// Merges duplicate records, keeping one per dedup key
///
/// Precedence: the record with richer contact info wins; ties go to the
/// source appearing earliest in `source_order` (the operator's configured
/// order). The merge is field-wise, so a losing duplicate still fills any
/// gap the winner has. Output order follows first discovery of each key.
pub fn deduplicate(
    records: Vec<ConferenceRecord>,
    source_order: &[SourceId],
) -> Vec<ConferenceRecord> {
    let mut merged: Vec<ConferenceRecord> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = dedup_key(&record);
        match index_by_key.get(&key) {
            None => {
                index_by_key.insert(key, merged.len());
                merged.push(record);
            }
            Some(&slot) => {
                let existing = &merged[slot];
                let incoming_wins = wins_over(&record, existing, source_order);
                let (winner, loser) = if incoming_wins {
                    (record, merged[slot].clone())
                } else {
                    (merged[slot].clone(), record)
                };
                merged[slot] = merge(winner, &loser);
            }
        }
    }

    merged
}

/// Whether `a` takes precedence over `b`
fn wins_over(a: &ConferenceRecord, b: &ConferenceRecord, source_order: &[SourceId]) -> bool {
    let (richness_a, richness_b) = (a.contact_richness(), b.contact_richness());
    if richness_a != richness_b {
        return richness_a > richness_b;
    }
    source_rank(a.source, source_order) < source_rank(b.source, source_order)
}

fn source_rank(source: SourceId, source_order: &[SourceId]) -> usize {
    source_order
        .iter()
        .position(|&s| s == source)
        .unwrap_or(usize::MAX)
}

/// Field-wise merge: the winner's values stand, its gaps fill from the loser
fn merge(mut winner: ConferenceRecord, loser: &ConferenceRecord) -> ConferenceRecord {
    if winner.start_date.is_none() {
        winner.start_date = loser.start_date;
    }
    if winner.end_date.is_none() {
        winner.end_date = loser.end_date;
    }
    if winner.description.is_none() {
        winner.description = loser.description.clone();
    }

    match (&mut winner.contact, &loser.contact) {
        (Some(winning), Some(losing)) => winning.fill_missing_from(losing),
        (None, Some(losing)) => winner.contact = Some(losing.clone()),
        _ => {}
    }

    winner
}
