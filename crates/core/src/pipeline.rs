//! The extract → classify → synthesize → normalize chain.
//!
//! A [`Pipeline`] owns its configuration and random source, so one
//! pipeline per worker is all the coordination parallel processing needs.

use std::panic::{AssertUnwindSafe, catch_unwind};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::config::PipelineConfig;
use crate::extract::extract_page;
use crate::normalize::{WalkRecord, normalize};
use crate::parse::Document;
use crate::signal::{ListingRow, RawWalkSignal};
use crate::synthesize::synthesize;
use crate::TrailmarkError;

/// Records produced from a batch of inputs, plus the inputs that were skipped.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<WalkRecord>,
    /// One [`TrailmarkError::RecordFailed`] per skipped input.
    pub failures: Vec<TrailmarkError>,
}

impl BatchReport {
    /// Input indices that produced no record.
    pub fn skipped_indices(&self) -> Vec<usize> {
        self.failures
            .iter()
            .filter_map(|failure| match failure {
                TrailmarkError::RecordFailed { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Appends another report, keeping input order.
    pub fn merge(&mut self, other: BatchReport) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }
}

/// Pipeline configuration plus the random source for jitter and variation.
///
/// # Example
///
/// ```rust
/// use trailmark_core::{Document, Pipeline, PipelineConfig};
///
/// let mut pipeline = Pipeline::new(PipelineConfig::builder().seed(7).build());
/// let doc = Document::parse("<h1>Neist Point Lighthouse Walk</h1><p>Distance 2.25km</p>").unwrap();
/// let record = pipeline.process_page(&doc, "https://www.walkhighlands.co.uk/skye/neistpoint.shtml");
///
/// assert_eq!(record.slug, "neist-point-lighthouse-walk");
/// assert_eq!(record.region_slug, "isle-of-skye");
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    rng: StdRng,
}

impl Pipeline {
    /// Seeds from `config.seed`, or from the OS when unset.
    pub fn new(config: PipelineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extracts and normalizes one walk page.
    pub fn process_page(&mut self, doc: &Document, source_url: &str) -> WalkRecord {
        let signal = extract_page(doc, source_url, &self.config);
        self.process_signal(&signal)
    }

    /// Classifies, synthesizes and normalizes one signal.
    pub fn process_signal(&mut self, signal: &RawWalkSignal) -> WalkRecord {
        let features = classify(signal);
        debug!(
            walk_type = ?features.walk_type,
            route_type = ?features.route_type,
            tier = %features.difficulty_tier,
            tags = features.tags.len(),
            "classified walk"
        );
        let synthesized = synthesize(signal, &features, &self.config, &mut self.rng);
        normalize(signal, &features, synthesized, &self.config, &mut self.rng)
    }

    /// [`Pipeline::process_signal`] that reports a panic or an invalid
    /// record as [`TrailmarkError::RecordFailed`] instead of emitting it.
    pub fn try_process_signal(&mut self, index: usize, signal: &RawWalkSignal) -> crate::Result<WalkRecord> {
        let title = signal.title.clone().unwrap_or_else(|| self.config.placeholder_title.clone());

        match catch_unwind(AssertUnwindSafe(|| self.process_signal(signal))) {
            Ok(record) => record.check(index),
            Err(panic) => {
                let reason = if let Some(message) = panic.downcast_ref::<&str>() {
                    (*message).to_string()
                } else if let Some(message) = panic.downcast_ref::<String>() {
                    message.clone()
                } else {
                    "unknown panic".to_string()
                };
                Err(TrailmarkError::RecordFailed { index, title, reason })
            }
        }
    }

    /// Processes signals in order. A failing signal is logged and skipped;
    /// the rest of the batch continues.
    pub fn process_signals<I>(&mut self, signals: I) -> BatchReport
    where
        I: IntoIterator<Item = RawWalkSignal>,
    {
        let mut report = BatchReport::default();
        for (index, signal) in signals.into_iter().enumerate() {
            match self.try_process_signal(index, &signal) {
                Ok(record) => report.records.push(record),
                Err(err) => {
                    warn!(index, title = signal.title.as_deref().unwrap_or_default(), error = %err, "skipping record");
                    report.failures.push(err);
                }
            }
        }
        report
    }

    /// Processes listing rows from a prior listing stage.
    pub fn process_rows(&mut self, rows: Vec<ListingRow>) -> BatchReport {
        self.process_signals(rows.into_iter().map(RawWalkSignal::from))
    }
}
