//! Data model for the outreach pipeline
//!
//! A `ConferenceRecord` is produced by a source adapter, enriched in place by
//! the contact extractor, and read-only for the normalizer and filter. The
//! exported unit is a `ConferenceContact`: the record joined with the
//! generated outreach message.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::ConfigError;

/// Identifies which listing site a record came from
///
/// The order of sources in the run configuration is meaningful: it is the
/// tie-breaker when duplicate records carry equally rich contact info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    ConferenceIndex,
    TenTimes,
    Eventbrite,
}

impl SourceId {
    /// The identifier used in configuration files and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConferenceIndex => "conferenceindex",
            Self::TenTimes => "10times",
            Self::Eventbrite => "eventbrite",
        }
    }
}

impl FromStr for SourceId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conferenceindex" => Ok(Self::ConferenceIndex),
            "10times" => Ok(Self::TenTimes),
            "eventbrite" => Ok(Self::Eventbrite),
            other => Err(ConfigError::UnknownSource(other.to_string())),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organizer contact details mined from a conference website
///
/// Every field is optional: "found nothing" is a valid terminal state and is
/// distinct from an empty string. Fields are only ever filled with validated,
/// non-empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub organizer_name: Option<String>,
    pub organizer_role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
}

impl ContactInfo {
    /// True when no field was found at all
    pub fn is_empty(&self) -> bool {
        self.non_empty_fields() == 0
    }

    /// Number of populated fields, used as the dedup richness measure
    pub fn non_empty_fields(&self) -> usize {
        [
            self.organizer_name.is_some(),
            self.organizer_role.is_some(),
            self.email.is_some(),
            self.phone.is_some(),
            self.linkedin_url.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }

    /// Fills any unset field from `other`, leaving set fields untouched
    pub fn fill_missing_from(&mut self, other: &ContactInfo) {
        if self.organizer_name.is_none() {
            self.organizer_name = other.organizer_name.clone();
        }
        if self.organizer_role.is_none() {
            self.organizer_role = other.organizer_role.clone();
        }
        if self.email.is_none() {
            self.email = other.email.clone();
        }
        if self.phone.is_none() {
            self.phone = other.phone.clone();
        }
        if self.linkedin_url.is_none() {
            self.linkedin_url = other.linkedin_url.clone();
        }
    }
}

/// A conference discovered on a listing site
///
/// `website_url` is required: a candidate without a resolvable URL never
/// becomes a record, because there is nothing for the contact extractor to
/// visit.
#[derive(Debug, Clone)]
pub struct ConferenceRecord {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: String,
    pub website_url: Url,
    pub source: SourceId,
    pub description: Option<String>,
    pub contact: Option<ContactInfo>,
}

impl ConferenceRecord {
    /// Number of populated contact fields (0 when no contact was attached)
    pub fn contact_richness(&self) -> usize {
        self.contact
            .as_ref()
            .map(ContactInfo::non_empty_fields)
            .unwrap_or(0)
    }
}

impl fmt::Display for ConferenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                write!(f, "{} ({} to {}) - {}", self.name, start, end, self.location)
            }
            (Some(start), None) => write!(f, "{} ({}) - {}", self.name, start, self.location),
            _ => write!(f, "{} - {}", self.name, self.location),
        }
    }
}

/// The exported unit: a record joined with its generated outreach message
#[derive(Debug, Clone)]
pub struct ConferenceContact {
    pub record: ConferenceRecord,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ConferenceRecord {
        ConferenceRecord {
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            end_date: None,
            location: "Berlin, Germany".to_string(),
            website_url: Url::parse("https://example-conf.org/").unwrap(),
            source: SourceId::ConferenceIndex,
            description: None,
            contact: None,
        }
    }

    #[test]
    fn test_source_id_round_trip() {
        for id in [
            SourceId::ConferenceIndex,
            SourceId::TenTimes,
            SourceId::Eventbrite,
        ] {
            assert_eq!(id.as_str().parse::<SourceId>().unwrap(), id);
        }
    }

    #[test]
    fn test_source_id_unknown() {
        assert!("meetup".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_contact_info_empty() {
        let info = ContactInfo::default();
        assert!(info.is_empty());
        assert_eq!(info.non_empty_fields(), 0);
    }

    #[test]
    fn test_contact_info_field_count() {
        let info = ContactInfo {
            organizer_name: Some("Jane Doe".to_string()),
            email: Some("jane@conf.org".to_string()),
            ..Default::default()
        };
        assert_eq!(info.non_empty_fields(), 2);
        assert!(!info.is_empty());
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut a = ContactInfo {
            email: Some("a@conf.org".to_string()),
            ..Default::default()
        };
        let b = ContactInfo {
            email: Some("b@conf.org".to_string()),
            phone: Some("+49 30 1234567".to_string()),
            ..Default::default()
        };

        a.fill_missing_from(&b);

        assert_eq!(a.email.as_deref(), Some("a@conf.org"));
        assert_eq!(a.phone.as_deref(), Some("+49 30 1234567"));
    }

    #[test]
    fn test_contact_richness() {
        let mut rec = record("AI Summit");
        assert_eq!(rec.contact_richness(), 0);

        rec.contact = Some(ContactInfo {
            email: Some("team@summit.org".to_string()),
            ..Default::default()
        });
        assert_eq!(rec.contact_richness(), 1);
    }

    #[test]
    fn test_display_with_dates() {
        let mut rec = record("AI Summit");
        rec.end_date = NaiveDate::from_ymd_opt(2025, 6, 3);
        assert_eq!(
            rec.to_string(),
            "AI Summit (2025-06-01 to 2025-06-03) - Berlin, Germany"
        );
    }
}
