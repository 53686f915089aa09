//! Tolerant date parsing for listing pages
//!
//! Every listing site formats event dates differently, and the same site is
//! not always consistent with itself. The parser here accepts the common
//! shapes and returns `None` for anything else; an unparsable date is a
//! reason to drop one record, never to fail a run.

use chrono::{Datelike, NaiveDate};

/// Formats accepted for a complete single date
const FULL_FORMATS: &[&str] = &[
    "%d %b %Y",  // 15 Jul 2025
    "%d %B %Y",  // 15 July 2025
    "%b %d, %Y", // Jul 15, 2025
    "%B %d, %Y", // July 15, 2025
    "%Y-%m-%d",  // 2025-07-15
    "%d.%m.%Y",  // 15.07.2025
    "%m/%d/%Y",  // 07/15/2025
];

/// Formats accepted for a date that borrowed its year from the range end
const YEARLESS_FORMATS: &[&str] = &["%d %b %Y", "%d %B %Y", "%b %d %Y", "%B %d %Y"];

/// Parses a date or date-range string from a listing page
///
/// Accepted shapes include single dates in the `FULL_FORMATS` list and the
/// range forms sites actually emit:
///
/// - `15 Jul 2025 - 17 Jul 2025`
/// - `15 Jul - 17 Jul 2025` (start borrows the end's year)
/// - `Jul 15 - Jul 17, 2025`
/// - `15-17 Jul 2025` (day range within one month)
///
/// Returns `(start, Some(end))` for ranges, `(start, None)` for single
/// dates, and `None` when nothing parses.
pub fn parse_date_span(text: &str) -> Option<(NaiveDate, Option<NaiveDate>)> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return None;
    }

    // Whole string as a single date first, so ISO dates do not get
    // mistaken for day ranges
    if let Some(date) = parse_single(&cleaned, None) {
        return Some((date, None));
    }

    // Spaced range: "start - end" (also en dashes and "to")
    for separator in [" - ", " \u{2013} ", " to "] {
        if let Some((lhs, rhs)) = cleaned.split_once(separator) {
            let end = parse_single(rhs.trim(), None)?;
            let start = parse_single(lhs.trim(), Some(end.year()))?;
            return Some((start, Some(end)));
        }
    }

    // Compact day range: "15-17 Jul 2025"
    if let Some((lhs, rhs)) = cleaned.split_once('-') {
        let day: u32 = lhs.trim().parse().ok()?;
        let end = parse_single(rhs.trim(), None)?;
        let start = NaiveDate::from_ymd_opt(end.year(), end.month(), day)?;
        return Some((start, Some(end)));
    }

    None
}

/// Parses one date, borrowing `fallback_year` when the text carries none
fn parse_single(text: &str, fallback_year: Option<i32>) -> Option<NaiveDate> {
    for format in FULL_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    if let Some(year) = fallback_year {
        let with_year = format!("{} {}", text, year);
        for format in YEARLESS_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&with_year, format) {
                return Some(date);
            }
        }
    }

    None
}

/// Collapses whitespace, strips ordinal suffixes and leading weekday names
fn clean(text: &str) -> String {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(strip_ordinal)
        .filter(|t| !is_weekday(t))
        .collect();
    tokens.join(" ")
}

/// Turns "15th" into "15"; other tokens pass through unchanged
fn strip_ordinal(token: &str) -> String {
    let (digits, rest) = token.split_at(token.chars().take_while(|c| c.is_ascii_digit()).count());
    if !digits.is_empty() && matches!(rest, "st" | "nd" | "rd" | "th") {
        digits.to_string()
    } else {
        token.to_string()
    }
}

fn is_weekday(token: &str) -> bool {
    let t = token.trim_end_matches(',').to_lowercase();
    matches!(
        t.as_str(),
        "mon" | "tue" | "wed" | "thu" | "fri" | "sat" | "sun"
            | "monday" | "tuesday" | "wednesday" | "thursday" | "friday" | "saturday" | "sunday"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_date_day_first() {
        assert_eq!(
            parse_date_span("15 Jul 2025"),
            Some((date(2025, 7, 15), None))
        );
    }

    #[test]
    fn test_single_date_month_first() {
        assert_eq!(
            parse_date_span("Jul 15, 2025"),
            Some((date(2025, 7, 15), None))
        );
    }

    #[test]
    fn test_single_date_iso() {
        assert_eq!(
            parse_date_span("2025-07-15"),
            Some((date(2025, 7, 15), None))
        );
    }

    #[test]
    fn test_full_range() {
        assert_eq!(
            parse_date_span("15 Jul 2025 - 17 Jul 2025"),
            Some((date(2025, 7, 15), Some(date(2025, 7, 17))))
        );
    }

    #[test]
    fn test_range_with_borrowed_year() {
        assert_eq!(
            parse_date_span("15 Jul - 17 Jul 2025"),
            Some((date(2025, 7, 15), Some(date(2025, 7, 17))))
        );
    }

    #[test]
    fn test_range_month_first_borrowed_year() {
        assert_eq!(
            parse_date_span("Jul 15 - Jul 17, 2025"),
            Some((date(2025, 7, 15), Some(date(2025, 7, 17))))
        );
    }

    #[test]
    fn test_compact_day_range() {
        assert_eq!(
            parse_date_span("15-17 Jul 2025"),
            Some((date(2025, 7, 15), Some(date(2025, 7, 17))))
        );
    }

    #[test]
    fn test_range_across_months() {
        assert_eq!(
            parse_date_span("30 Jun - 2 Jul 2025"),
            Some((date(2025, 6, 30), Some(date(2025, 7, 2))))
        );
    }

    #[test]
    fn test_ordinal_suffixes_stripped() {
        assert_eq!(
            parse_date_span("15th Jul 2025"),
            Some((date(2025, 7, 15), None))
        );
    }

    #[test]
    fn test_weekday_prefix_ignored() {
        assert_eq!(
            parse_date_span("Tue, 15 Jul 2025"),
            Some((date(2025, 7, 15), None))
        );
    }

    #[test]
    fn test_unparsable_returns_none() {
        assert_eq!(parse_date_span("coming soon"), None);
        assert_eq!(parse_date_span(""), None);
        assert_eq!(parse_date_span("TBA - check back later"), None);
    }

    #[test]
    fn test_invalid_day_range_returns_none() {
        assert_eq!(parse_date_span("40-45 Jul 2025"), None);
    }
}
