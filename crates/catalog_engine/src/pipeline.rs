use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use catalog_core::{is_well_formed_media_url, CatalogItem, RunStats, RunSummary};
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::export::{ExportError, JsonLinesExporter};
use crate::text::strip_markup;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fatal: the run cannot continue without its export stream.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// What a stage decided for one item.
#[derive(Debug)]
pub enum StageOutcome {
    Continue(CatalogItem),
    /// Stops the remaining stages for this item only; the reason lands in
    /// the run's drop tally.
    Drop { reason: String },
}

/// One post-processing stage. Stages hold no per-run state of their own;
/// everything shared lives in the [`RunContext`] passed to each invocation.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn process(
        &self,
        item: CatalogItem,
        cx: &mut RunContext,
    ) -> Result<StageOutcome, PipelineError>;
}

/// Per-run shared state: the dedup fingerprint set, counters and the export
/// stream. Created at pipeline start, consumed by [`RunContext::finish`].
/// Single `&mut` ownership is what serializes access to all three.
#[derive(Debug)]
pub struct RunContext {
    source: String,
    seen: HashSet<String>,
    stats: RunStats,
    exporter: JsonLinesExporter,
}

impl RunContext {
    pub fn start(output_dir: &Path, source: &str) -> Result<Self, PipelineError> {
        let exporter = JsonLinesExporter::open(output_dir, source)?;
        log::info!("run started, exporting to {}", exporter.path().display());
        Ok(Self {
            source: source.to_string(),
            seen: HashSet::new(),
            stats: RunStats::new(),
            exporter,
        })
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn note_failed_media(&mut self) {
        self.stats.record_failed_media();
    }

    /// Flushes and closes the export stream and reports the run summary.
    pub fn finish(self) -> Result<RunSummary, PipelineError> {
        let stats = self.stats;
        let path = self.exporter.finish()?;
        log::info!(
            "run finished: {} processed, {} dropped, {} failed media",
            stats.processed,
            stats.dropped,
            stats.failed_media
        );
        Ok(RunSummary::from_stats(stats, path))
    }
}

/// The fixed stage order of the processing pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Dedup, validate, clean, enrich, export: the standard order.
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(Deduplicator),
                Box::new(Validator),
                Box::new(Cleaner),
                Box::new(MetadataEnricher),
                Box::new(Exporter),
            ],
        }
    }

    /// Runs one item through every stage. Returns the exported item, or
    /// `None` when a stage dropped it; a drop never affects other items.
    pub fn process(
        &self,
        item: CatalogItem,
        cx: &mut RunContext,
    ) -> Result<Option<CatalogItem>, PipelineError> {
        let url = item.url().to_string();
        let kind = item.kind_name();
        let mut current = item;
        for stage in &self.stages {
            match stage.process(current, cx)? {
                StageOutcome::Continue(next) => current = next,
                StageOutcome::Drop { reason } => {
                    cx.stats.record_dropped(&reason);
                    log::warn!("dropped {kind} {url}: {reason} (stage {})", stage.name());
                    return Ok(None);
                }
            }
        }
        Ok(Some(current))
    }
}

/// Drops products whose (url, sku) fingerprint was already seen this run.
///
/// Categories pass through untouched: the source exports them as plain
/// items without identity checks, and that asymmetry is kept deliberate.
pub struct Deduplicator;

impl Stage for Deduplicator {
    fn name(&self) -> &'static str {
        "dedup"
    }

    fn process(
        &self,
        item: CatalogItem,
        cx: &mut RunContext,
    ) -> Result<StageOutcome, PipelineError> {
        let record = match item {
            CatalogItem::Product(record) => record,
            category => return Ok(StageOutcome::Continue(category)),
        };
        if record.url.trim().is_empty() {
            return Ok(StageOutcome::Drop {
                reason: "missing url".to_string(),
            });
        }
        let fingerprint = fingerprint(&record.url, &record.sku);
        if !cx.seen.insert(fingerprint) {
            return Ok(StageOutcome::Drop {
                reason: "duplicate".to_string(),
            });
        }
        Ok(StageOutcome::Continue(CatalogItem::Product(record)))
    }
}

/// Drops products that still have no name after extraction.
pub struct Validator;

impl Stage for Validator {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn process(
        &self,
        item: CatalogItem,
        _cx: &mut RunContext,
    ) -> Result<StageOutcome, PipelineError> {
        if let CatalogItem::Product(record) = &item {
            if record.name.trim().is_empty() {
                return Ok(StageOutcome::Drop {
                    reason: "missing name".to_string(),
                });
            }
        }
        Ok(StageOutcome::Continue(item))
    }
}

/// Normalizes text fields and label sets and filters candidate media URLs.
/// Idempotent: cleaning an already clean item is the identity.
pub struct Cleaner;

impl Stage for Cleaner {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn process(
        &self,
        item: CatalogItem,
        _cx: &mut RunContext,
    ) -> Result<StageOutcome, PipelineError> {
        let cleaned = match item {
            CatalogItem::Product(mut record) => {
                for field in [
                    &mut record.name,
                    &mut record.description,
                    &mut record.short_description,
                    &mut record.category,
                    &mut record.parent_category,
                    &mut record.nested_category,
                    &mut record.brand,
                    &mut record.mpn,
                    &mut record.gtin,
                ] {
                    *field = strip_markup(field);
                }
                for value in record.attributes.values_mut() {
                    *value = strip_markup(value);
                }
                record.colors = clean_labels(record.colors);
                record.sizes = clean_labels(record.sizes);
                record
                    .image_urls
                    .retain(|candidate| is_well_formed_media_url(candidate));
                CatalogItem::Product(record)
            }
            CatalogItem::Category(mut node) => {
                // Name and breadcrumb are cleaned together so the
                // breadcrumb-ends-in-name invariant survives.
                node.name = strip_markup(&node.name);
                node.parent_name = strip_markup(&node.parent_name);
                for part in &mut node.breadcrumb {
                    *part = strip_markup(part);
                }
                CatalogItem::Category(node)
            }
        };
        Ok(StageOutcome::Continue(cleaned))
    }
}

/// Stamps the extraction timestamp and source tag when absent. Categories
/// carry `discovered_at` from construction and have no source field.
pub struct MetadataEnricher;

impl Stage for MetadataEnricher {
    fn name(&self) -> &'static str {
        "enrich"
    }

    fn process(
        &self,
        item: CatalogItem,
        cx: &mut RunContext,
    ) -> Result<StageOutcome, PipelineError> {
        match item {
            CatalogItem::Product(mut record) => {
                if record.timestamp.is_none() {
                    record.timestamp = Some(Utc::now());
                }
                if record.source.is_empty() {
                    record.source = cx.source.clone();
                }
                Ok(StageOutcome::Continue(CatalogItem::Product(record)))
            }
            category => Ok(StageOutcome::Continue(category)),
        }
    }
}

/// Terminal stage: writes the item to the run's export stream and counts it
/// as processed. Export is not reversible.
pub struct Exporter;

impl Stage for Exporter {
    fn name(&self) -> &'static str {
        "export"
    }

    fn process(
        &self,
        item: CatalogItem,
        cx: &mut RunContext,
    ) -> Result<StageOutcome, PipelineError> {
        cx.exporter.export(&item)?;
        cx.stats.record_processed();
        log::debug!("exported {} {}", item.kind_name(), item.url());
        Ok(StageOutcome::Continue(item))
    }
}

/// Stable identity digest over the record's (url, sku) pair.
fn fingerprint(url: &str, sku: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b":");
    hasher.update(sku.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

fn clean_labels(labels: Vec<String>) -> Vec<String> {
    let set: BTreeSet<String> = labels
        .into_iter()
        .map(|label| strip_markup(&label))
        .filter(|label| !label.is_empty())
        .collect();
    set.into_iter().collect()
}
