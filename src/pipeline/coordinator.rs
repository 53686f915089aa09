//! Pipeline coordination
//!
//! Wires the stages together: listing across adapters, filtering, contact
//! extraction, normalization and dedup, message generation. Each
//! network-bound stage runs under a bounded worker pool; uncontrolled
//! concurrency is the primary cause of anti-bot blocking.

use crate::config::Config;
use crate::extract::ContactExtractor;
use crate::fetch::PageFetcher;
use crate::filter::{apply_cap, FilterCriteria};
use crate::normalize::{deduplicate, normalize_records};
use crate::outreach::{MessageGenerator, TemplateGenerator};
use crate::pacing::RateController;
use crate::record::{ConferenceContact, ConferenceRecord, ContactInfo, SourceId};
use crate::report::{FailureKind, RunReport, Stage};
use crate::sources::{build_adapters, ListingQuery, SourceAdapter};
use crate::ScoutError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs the whole pipeline for one configuration
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<PageFetcher>,
    report: Arc<RunReport>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    generator: Box<dyn MessageGenerator>,
    source_order: Vec<SourceId>,
}

impl Coordinator {
    /// Creates a coordinator with the standard adapters for the configured
    /// sources
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        let source_order = parse_sources(&config)?;
        let adapters = build_adapters(&source_order)
            .into_iter()
            .map(Arc::from)
            .collect();
        Self::assemble(config, adapters, source_order)
    }

    /// Creates a coordinator with caller-provided adapters
    ///
    /// The orchestration is adapter-agnostic; tests and embedders inject
    /// adapters pointed at their own endpoints.
    pub fn with_adapters(
        config: Config,
        adapters: Vec<Arc<dyn SourceAdapter>>,
    ) -> Result<Self, ScoutError> {
        let source_order = adapters.iter().map(|a| a.id()).collect();
        Self::assemble(config, adapters, source_order)
    }

    fn assemble(
        config: Config,
        adapters: Vec<Arc<dyn SourceAdapter>>,
        source_order: Vec<SourceId>,
    ) -> Result<Self, ScoutError> {
        let report = Arc::new(RunReport::new());
        let controller = Arc::new(RateController::new(
            config.pacing.clone(),
            config.identity.user_agents.clone(),
        ));
        let fetcher = Arc::new(PageFetcher::new(
            config.fetch.clone(),
            controller,
            report.clone(),
        )?);
        let generator = Box::new(TemplateGenerator::new(config.outreach.clone()));

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            report,
            adapters,
            generator,
            source_order,
        })
    }

    /// The run's diagnostics, for summary printing after the run
    pub fn report(&self) -> Arc<RunReport> {
        self.report.clone()
    }

    /// Executes the full pipeline and returns the final record set
    pub async fn run(&self) -> Result<Vec<ConferenceContact>, ScoutError> {
        let started = Instant::now();
        let deadline = self
            .config
            .pipeline
            .max_runtime_secs
            .map(|secs| started + Duration::from_secs(secs));

        // Stage 1: listing across sources
        let candidates = self.list_all(deadline).await;
        tracing::info!("Listing produced {} raw candidates", candidates.len());
        if candidates.is_empty() {
            return Err(ScoutError::NoResults);
        }

        // Stage 2: cheap filter before the expensive extraction stage
        let criteria = FilterCriteria::from_config(&self.config.search);
        let candidates: Vec<ConferenceRecord> = candidates
            .into_iter()
            .filter(|record| criteria.matches(record))
            .collect();
        let mut candidates = apply_cap(candidates, self.config.search.max_conferences);
        tracing::info!("{} candidates after filtering", candidates.len());

        // Stage 3: contact extraction
        self.extract_all(&mut candidates, deadline).await;

        // Stage 4: normalize, dedup, and re-filter records whose fields
        // were corrected during normalization
        normalize_records(&mut candidates);
        let records = deduplicate(candidates, &self.source_order);
        let records: Vec<ConferenceRecord> = records
            .into_iter()
            .filter(|record| criteria.matches(record))
            .collect();
        tracing::info!("{} records after dedup", records.len());

        // Stage 5: outreach message generation
        let contacts = self.generate_messages(records);

        tracing::info!(
            "Pipeline finished: {} records in {:?}, {} recorded failures",
            contacts.len(),
            started.elapsed(),
            self.report.failure_count()
        );

        Ok(contacts)
    }

    /// Runs every adapter under the listing worker pool, concatenating
    /// results in configuration order
    async fn list_all(&self, deadline: Option<Instant>) -> Vec<ConferenceRecord> {
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.listing_concurrency));
        let query = ListingQuery::from_config(&self.config);
        let mut tasks: JoinSet<(usize, Vec<ConferenceRecord>)> = JoinSet::new();

        for (index, adapter) in self.adapters.iter().enumerate() {
            if past(deadline) {
                tracing::warn!("Run deadline reached; skipping remaining sources");
                break;
            }
            let adapter = adapter.clone();
            let fetcher = self.fetcher.clone();
            let report = self.report.clone();
            let query = query.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let records = adapter.list(&query, &fetcher, &report).await;
                (index, records)
            });
        }

        let mut per_source: Vec<(usize, Vec<ConferenceRecord>)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => per_source.push(result),
                Err(e) => tracing::error!("Listing task failed: {}", e),
            }
        }

        per_source.sort_by_key(|(index, _)| *index);
        per_source
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect()
    }

    /// Extracts contacts for every candidate under the extraction pool
    ///
    /// The deadline is checked at record granularity: once reached, no new
    /// extraction starts, but in-flight work drains normally.
    async fn extract_all(&self, candidates: &mut [ConferenceRecord], deadline: Option<Instant>) {
        let extractor = Arc::new(ContactExtractor::new(&self.config.extract));
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.extraction_concurrency));
        let mut tasks: JoinSet<(usize, ContactInfo)> = JoinSet::new();

        for (index, record) in candidates.iter().enumerate() {
            if past(deadline) {
                tracing::warn!(
                    "Run deadline reached; {} candidates keep no contact",
                    candidates.len() - index
                );
                break;
            }
            let extractor = extractor.clone();
            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();
            let website_url = record.website_url.clone();
            let name = record.name.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tracing::info!("Extracting contacts for '{}'", name);
                let info = extractor.extract(&website_url, &fetcher).await;
                (index, info)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, info)) => {
                    // An all-empty result is the valid "no contact found"
                    // terminal state
                    candidates[index].contact = (!info.is_empty()).then_some(info);
                }
                Err(e) => tracing::error!("Extraction task failed: {}", e),
            }
        }
    }

    /// Generates the outreach message for each final record
    ///
    /// Generator failures are recorded and leave the message empty; they
    /// never discard extracted contact data.
    fn generate_messages(&self, records: Vec<ConferenceRecord>) -> Vec<ConferenceContact> {
        records
            .into_iter()
            .map(|record| {
                let message = match self.generator.generate(&record) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        self.report.record_failure(
                            Stage::Generation,
                            FailureKind::Transport,
                            record.website_url.as_str(),
                            &e.to_string(),
                        );
                        None
                    }
                };
                ConferenceContact { record, message }
            })
            .collect()
    }
}

fn parse_sources(config: &Config) -> Result<Vec<SourceId>, ScoutError> {
    config
        .search
        .sources
        .iter()
        .map(|s| s.parse::<SourceId>().map_err(ScoutError::from))
        .collect()
}

fn past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}
