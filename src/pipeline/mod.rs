//! Pipeline orchestration
//!
//! Entry point tying the stages together. The control flow is: sources
//! produce raw candidates, the filter narrows them, the contact extractor
//! enriches the survivors, normalization and dedup merge the result, and
//! the message generator fills in the outreach text.

mod coordinator;

pub use coordinator::Coordinator;

use crate::config::Config;
use crate::record::ConferenceContact;
use crate::Result;

/// Runs the full discovery and extraction pipeline
///
/// Returns the final deduplicated record set, ready for export. The only
/// fatal outcomes are an invalid configuration (caught before this point)
/// and every source coming back empty.
pub async fn run(config: Config) -> Result<Vec<ConferenceContact>> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
