//! Batch driver: URL scheduling, pacing and checkpoints.
//!
//! Everything here is I/O plumbing around [`Pipeline`]. Pacing and
//! checkpointing never affect what a record contains.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::BatchConfig;
use crate::normalize::WalkRecord;
use crate::signal::ListingRow;
use crate::{Result, TrailmarkError};

#[cfg(feature = "fetch")]
use crate::pipeline::{BatchReport, Pipeline};

/// Reads the distinct `source_url`s of a listing-rows JSON file, in order.
pub fn load_urls(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(TrailmarkError::FileNotFound(path.to_path_buf()));
    }
    let rows: Vec<ListingRow> = serde_json::from_str(&fs::read_to_string(path)?)?;

    let mut seen = HashSet::new();
    Ok(rows
        .into_iter()
        .filter_map(|row| row.source_url)
        .filter(|url| !url.trim().is_empty())
        .filter(|url| seen.insert(url.clone()))
        .collect())
}

/// Moves URLs matching a priority keyword to the front, keeping the
/// relative order within both groups.
pub fn prioritize(urls: Vec<String>, config: &BatchConfig) -> Vec<String> {
    let (mut priority, rest): (Vec<String>, Vec<String>) = urls.into_iter().partition(|url| config.is_priority(url));
    priority.extend(rest);
    priority
}

/// `<dir>/walks_batch_<n>.json`
pub fn checkpoint_path(dir: &Path, batch_number: usize) -> PathBuf {
    dir.join(format!("walks_batch_{}.json", batch_number))
}

/// 1-based batch number of the batch whose first URL sits at `first_index`
/// in the full URL list, so resumed runs never reuse an earlier number.
pub fn batch_number(first_index: usize, batch_size: usize) -> usize {
    first_index / batch_size.max(1) + 1
}

/// Writes records as a pretty-printed JSON array.
pub fn write_records(path: &Path, records: &[WalkRecord]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    Ok(())
}

/// Fetches and processes URLs in paced batches.
#[cfg(feature = "fetch")]
pub struct BatchDriver {
    config: BatchConfig,
    pipeline: Pipeline,
}

#[cfg(feature = "fetch")]
impl BatchDriver {
    pub fn new(config: BatchConfig, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    /// Processes `urls[start..]` in batches of `batch_size`.
    ///
    /// Requests are spaced by the configured delay, batches by the
    /// configured pause. After each batch that produced records, the
    /// batch is written to [`checkpoint_path`], numbered by
    /// [`batch_number`] from its absolute position in `urls`. Fetch, parse
    /// and record failures are logged and
    /// collected in the report; the run carries on.
    ///
    /// # Errors
    ///
    /// Only a failed checkpoint write aborts the run.
    pub async fn run(&mut self, urls: &[String], start: usize) -> Result<BatchReport> {
        use std::time::Duration;

        use tracing::{info, warn};

        use crate::extract::extract_page;
        use crate::fetch::fetch_url;
        use crate::parse::Document;

        let mut report = BatchReport::default();
        let pending = urls.get(start..).unwrap_or_default();
        let batch_size = self.config.batch_size.max(1);
        let batch_count = pending.len().div_ceil(batch_size);
        self.config.validate()?;
        let delay = Duration::from_secs_f64(self.config.request_delay_secs);
        let pause = Duration::from_secs_f64(self.config.batch_pause_secs);

        for (batch_index, batch) in pending.chunks(batch_size).enumerate() {
            let first_index = start + batch_index * batch_size;
            let number = batch_number(first_index, batch_size);
            info!(batch = number, position = batch_index + 1, of = batch_count, urls = batch.len(), "starting batch");
            let mut batch_records = Vec::new();

            for (offset, url) in batch.iter().enumerate() {
                let index = first_index + offset;

                let outcome = match fetch_url(url, &self.config.fetch).await {
                    Ok(html) => Document::parse(&html).and_then(|doc| {
                        let signal = extract_page(&doc, url, self.pipeline.config());
                        self.pipeline.try_process_signal(index, &signal)
                    }),
                    Err(err) => Err(err),
                };

                match outcome {
                    Ok(record) => batch_records.push(record),
                    Err(err) => {
                        warn!(index, url = url.as_str(), error = %err, "skipping walk");
                        report.failures.push(match err {
                            failed @ TrailmarkError::RecordFailed { .. } => failed,
                            other => TrailmarkError::RecordFailed { index, title: url.clone(), reason: other.to_string() },
                        });
                    }
                }

                if offset + 1 < batch.len() {
                    tokio::time::sleep(delay).await;
                }
            }

            if !batch_records.is_empty() {
                let path = checkpoint_path(&self.config.checkpoint_dir, number);
                write_records(&path, &batch_records)?;
                info!(path = %path.display(), records = batch_records.len(), "wrote checkpoint");
            }
            report.records.extend(batch_records);

            if batch_index + 1 < batch_count {
                tokio::time::sleep(pause).await;
            }
        }

        Ok(report)
    }
}
