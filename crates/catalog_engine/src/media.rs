use std::collections::HashMap;

use catalog_core::{ImageOutcome, MediaFetchResult, MediaTask, ProductRecord, RecordId};

use crate::filename::media_filename;
use crate::persist::MediaStore;

/// Result of dispatching a record's candidate images.
#[derive(Debug)]
pub enum MediaDispatch {
    /// No candidate URLs: the record's image list is already fully resolved.
    Ready(ProductRecord),
    /// Fetch tasks for the crawl engine; the record is parked until every
    /// task has completed, success or failure.
    Pending {
        record: RecordId,
        tasks: Vec<MediaTask>,
    },
}

/// Explicit per-record join of expected vs completed media tasks.
///
/// "All media resolved" is a state transition on this bookkeeping, not a
/// callback side effect, so the handover to the processing pipeline can be
/// audited. Dropping the whole [`MediaAcquisition`] abandons parked records;
/// a record is never released with a partially-resolved image list.
#[derive(Debug)]
struct MediaJoin {
    record: ProductRecord,
    expected: usize,
    outcomes: Vec<ImageOutcome>,
}

#[derive(Debug)]
pub struct MediaAcquisition {
    store: MediaStore,
    joins: HashMap<RecordId, MediaJoin>,
    next_record: RecordId,
}

impl MediaAcquisition {
    pub fn new(store: MediaStore) -> Self {
        Self {
            store,
            joins: HashMap::new(),
            next_record: 0,
        }
    }

    /// Derives one tagged fetch task per distinct candidate URL and parks
    /// the record until the tasks complete.
    pub fn begin(&mut self, record: ProductRecord) -> MediaDispatch {
        let mut candidates: Vec<String> = Vec::new();
        for url in &record.image_urls {
            if !candidates.iter().any(|seen| seen == url) {
                candidates.push(url.clone());
            }
        }
        if candidates.is_empty() {
            return MediaDispatch::Ready(record);
        }

        let id = self.next_record;
        self.next_record += 1;

        let tasks: Vec<MediaTask> = candidates
            .iter()
            .map(|url| MediaTask {
                record: id,
                source_url: url.clone(),
                filename: media_filename(&record.sku, url),
            })
            .collect();

        self.joins.insert(
            id,
            MediaJoin {
                record,
                expected: tasks.len(),
                outcomes: Vec::new(),
            },
        );

        MediaDispatch::Pending { record: id, tasks }
    }

    /// Reconciles one completion onto the owning record: fetched bytes are
    /// persisted under the task's filename with a content checksum, a
    /// failure is captured as-is. Completions may arrive in any order and
    /// interleaved across records; one failed image never blocks the rest.
    ///
    /// Returns the record exactly when its last outstanding task landed.
    pub fn complete(
        &mut self,
        task: &MediaTask,
        result: MediaFetchResult,
    ) -> Option<ProductRecord> {
        let join = match self.joins.get_mut(&task.record) {
            Some(join) => join,
            None => {
                log::warn!(
                    "media completion for unknown record {} ({})",
                    task.record,
                    task.source_url
                );
                return None;
            }
        };

        let outcome = match result {
            MediaFetchResult::Fetched(bytes) => match self.store.store(&task.filename, &bytes) {
                Ok(asset) => ImageOutcome::downloaded(
                    task.source_url.as_str(),
                    asset.path.to_string_lossy(),
                    asset.checksum,
                ),
                Err(err) => {
                    log::warn!("failed to persist {}: {err}", task.filename);
                    ImageOutcome::failed(task.source_url.as_str(), err.to_string())
                }
            },
            MediaFetchResult::Failed(error) => {
                ImageOutcome::failed(task.source_url.as_str(), error)
            }
        };
        join.outcomes.push(outcome);

        if join.outcomes.len() < join.expected {
            return None;
        }
        let mut join = self.joins.remove(&task.record)?;
        join.record.images = std::mem::take(&mut join.outcomes);
        Some(join.record)
    }

    /// Records still waiting on media completions.
    pub fn pending(&self) -> usize {
        self.joins.len()
    }
}
