use catalog_core::{
    CatalogItem, FetchTask, MediaFetchResult, MediaTask, PageKind, PageResponse, RunSummary,
};
use engine_logging::engine_info;
use thiserror::Error;

use crate::discover::{discover_nested, discover_root, scan_category_page, Discovery};
use crate::extract::{extract_product, ExtractError};
use crate::media::{MediaAcquisition, MediaDispatch};
use crate::persist::{MediaStore, PersistError};
use crate::pipeline::{Pipeline, PipelineError, RunContext};
use crate::profile::{RunConfig, SiteProfile};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("media store: {0}")]
    Persist(#[from] PersistError),
}

/// Wires discovery, extraction, media acquisition and the processing
/// pipeline behind the callbacks the external crawl engine drives.
///
/// The session owns the run's shared state exclusively; the engine feeds it
/// one callback at a time and forwards the fetch tasks it returns. Dropping
/// a session mid-run abandons records still waiting on media; they are
/// never exported with a partial image list.
pub struct HarvestSession {
    profile: SiteProfile,
    pipeline: Pipeline,
    media: MediaAcquisition,
    cx: RunContext,
}

impl HarvestSession {
    pub fn start(profile: SiteProfile, config: &RunConfig) -> Result<Self, SessionError> {
        let cx = RunContext::start(&config.output_dir, &profile.source)?;
        let media = MediaAcquisition::new(MediaStore::open(config.media_dir.clone())?);
        Ok(Self {
            profile,
            pipeline: Pipeline::standard(),
            media,
            cx,
        })
    }

    /// Routes one fetched page body and returns the follow-up fetch tasks
    /// for the engine. Category nodes discovered along the way go straight
    /// through the processing pipeline; product records first wait for
    /// their media.
    pub fn on_page(&mut self, page: &PageResponse) -> Result<Vec<FetchTask>, SessionError> {
        match page.kind {
            PageKind::Root => {
                let mut tasks = Vec::new();
                let emissions: Vec<Discovery> =
                    discover_root(&page.body, &page.url, &self.profile).collect();
                for emit in emissions {
                    self.handle_discovery(emit, &mut tasks)?;
                }
                Ok(tasks)
            }
            PageKind::Category => {
                let mut tasks = Vec::new();
                let emissions: Vec<Discovery> =
                    discover_nested(&page.body, &page.url, &page.context, &self.profile).collect();
                for emit in emissions {
                    self.handle_discovery(emit, &mut tasks)?;
                }
                tasks.extend(scan_category_page(&page.body, &page.url, &page.context));
                Ok(tasks)
            }
            PageKind::Product => {
                let record = extract_product(&page.body, &page.url, &page.context, &self.profile)?;
                match self.media.begin(record) {
                    MediaDispatch::Ready(record) => {
                        self.pipeline
                            .process(CatalogItem::Product(record), &mut self.cx)?;
                        Ok(Vec::new())
                    }
                    MediaDispatch::Pending { tasks, .. } => {
                        Ok(tasks.into_iter().map(FetchTask::Media).collect())
                    }
                }
            }
        }
    }

    /// Applies one media completion. When it was the record's last
    /// outstanding task, the fully-resolved record enters the pipeline.
    pub fn on_media(
        &mut self,
        task: &MediaTask,
        result: MediaFetchResult,
    ) -> Result<(), SessionError> {
        if let Some(record) = self.media.complete(task, result) {
            let failed = record.images.iter().filter(|o| !o.is_downloaded()).count();
            for _ in 0..failed {
                self.cx.note_failed_media();
            }
            self.pipeline
                .process(CatalogItem::Product(record), &mut self.cx)?;
        }
        Ok(())
    }

    /// Closes the export stream and reports the run summary. Records still
    /// waiting on media are discarded, not exported.
    pub fn finish(self) -> Result<RunSummary, SessionError> {
        if self.media.pending() > 0 {
            engine_info!(
                "abandoning {} records with unresolved media",
                self.media.pending()
            );
        }
        Ok(self.cx.finish()?)
    }

    fn handle_discovery(
        &mut self,
        emit: Discovery,
        tasks: &mut Vec<FetchTask>,
    ) -> Result<(), SessionError> {
        match emit {
            Discovery::Node(node) => {
                self.pipeline
                    .process(CatalogItem::Category(node), &mut self.cx)?;
            }
            Discovery::Task(task) => tasks.push(task),
        }
        Ok(())
    }
}
