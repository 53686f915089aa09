//! Outreach message generation
//!
//! The pipeline treats message generation as a capability: anything that
//! can turn a finished record into outreach text. The built-in
//! implementation is a deterministic template; an LLM-backed generator
//! would plug in behind the same trait. A generator failure never discards
//! the extracted contact data: the record ships with an empty message and
//! the failure is recorded.

use crate::config::OutreachConfig;
use crate::record::ConferenceRecord;
use thiserror::Error;

/// Why a message could not be generated
#[derive(Debug, Error)]
#[error("message generation failed: {0}")]
pub struct GenerateError(pub String);

/// Turns one finished record into outreach text
pub trait MessageGenerator: Send + Sync {
    fn generate(&self, record: &ConferenceRecord) -> Result<String, GenerateError>;
}

/// Deterministic template-based generator
pub struct TemplateGenerator {
    profile: OutreachConfig,
}

impl TemplateGenerator {
    pub fn new(profile: OutreachConfig) -> Self {
        Self { profile }
    }
}

impl MessageGenerator for TemplateGenerator {
    fn generate(&self, record: &ConferenceRecord) -> Result<String, GenerateError> {
        let greeting = record
            .contact
            .as_ref()
            .and_then(|c| c.organizer_name.as_deref())
            .map(|name| format!("Dear {},", name))
            .unwrap_or_else(|| "Dear organizing team,".to_string());

        let timeframe = record
            .start_date
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| "the upcoming edition".to_string());

        let message = format!(
            "Subject: Speaking Opportunity at {name}\n\
             \n\
             {greeting}\n\
             \n\
             I noticed that you're organizing {name} in {location} this {timeframe}, \
             and I'm reaching out to explore the possibility of contributing as a speaker.\n\
             \n\
             At {company}, we specialize in {company_description} I believe our expertise \
             would be valuable to your audience.\n\
             \n\
             {speaker}, our {speaker_title}, has extensive experience presenting at similar \
             events. Would you be open to a brief call to discuss potential speaking \
             opportunities or other ways we might contribute to your event?\n\
             \n\
             Thank you for considering this request.\n\
             \n\
             Best regards,\n\
             \n\
             {speaker}\n\
             {speaker_title}\n\
             {company}",
            name = record.name,
            greeting = greeting,
            location = record.location,
            timeframe = timeframe,
            company = self.profile.company_name,
            company_description = self.profile.company_description,
            speaker = self.profile.speaker_name,
            speaker_title = self.profile.speaker_title,
        );

        Ok(message)
    }
}
