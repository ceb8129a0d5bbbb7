//! Catalog engine: extraction and post-processing pipeline.
//!
//! The crawl engine that owns transport drives this crate through callbacks:
//! page bodies come in, [`catalog_core::FetchTask`]s go out, finished records
//! flow through the processing pipeline into the run's export stream.
mod discover;
mod export;
mod extract;
mod fallback;
mod filename;
mod islands;
mod media;
mod persist;
mod pipeline;
mod profile;
mod session;
mod text;

pub use discover::{discover_nested, discover_root, scan_category_page, Discovery};
pub use export::{ExportError, JsonLinesExporter};
pub use extract::{extract_product, ExtractError};
pub use fallback::{SelectorChain, SelectorVariant, ValueSource, COLOR_FALLBACKS, SIZE_FALLBACKS};
pub use filename::media_filename;
pub use islands::{parse_island, IslandData};
pub use media::{MediaAcquisition, MediaDispatch};
pub use persist::{ensure_output_dir, MediaStore, PersistError, StoredAsset};
pub use pipeline::{
    Cleaner, Deduplicator, Exporter, MetadataEnricher, Pipeline, PipelineError, RunContext,
    Stage, StageOutcome, Validator,
};
pub use profile::{RunConfig, SiteProfile};
pub use session::{HarvestSession, SessionError};
pub use text::{collapse_whitespace, parse_money, strip_markup};
