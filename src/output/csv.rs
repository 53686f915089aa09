//! CSV export
//!
//! Writes the final record set with one row per conference. Fields are
//! quoted per RFC 4180 so names and generated messages survive commas and
//! line breaks.

use crate::output::ExportResult;
use crate::record::ConferenceContact;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// The stable column set promised to downstream consumers
pub const CSV_COLUMNS: &[&str] = &[
    "conference_name",
    "start_date",
    "end_date",
    "location",
    "website_url",
    "organizer_name",
    "organizer_role",
    "email",
    "phone",
    "linkedin",
    "generated_message",
];

/// Exports the final record set to a CSV file
///
/// A conference with no contact found still gets a row; absence of contact
/// data is a valid terminal state, not a reason to drop the record.
pub fn export_csv(contacts: &[ConferenceContact], path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    writeln!(file, "{}", CSV_COLUMNS.join(","))?;

    for contact in contacts {
        writeln!(file, "{}", format_row(contact))?;
    }

    tracing::info!("Exported {} records to {}", contacts.len(), path.display());
    Ok(())
}

fn format_row(contact: &ConferenceContact) -> String {
    let record = &contact.record;
    let info = record.contact.clone().unwrap_or_default();

    let fields = [
        record.name.clone(),
        record.start_date.map(|d| d.to_string()).unwrap_or_default(),
        record.end_date.map(|d| d.to_string()).unwrap_or_default(),
        record.location.clone(),
        record.website_url.to_string(),
        info.organizer_name.unwrap_or_default(),
        info.organizer_role.unwrap_or_default(),
        info.email.unwrap_or_default(),
        info.phone.unwrap_or_default(),
        info.linkedin_url.unwrap_or_default(),
        contact.message.clone().unwrap_or_default(),
    ];

    fields
        .iter()
        .map(|field| escape(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a field when it contains a delimiter, quote or newline
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
