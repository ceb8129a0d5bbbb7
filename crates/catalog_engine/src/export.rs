use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use catalog_core::CatalogItem;
use chrono::Utc;
use thiserror::Error;

use crate::persist::{ensure_output_dir, PersistError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// The run-scoped export stream: one self-contained JSON line per item.
///
/// Opened (created/truncated) at pipeline start, flushed and closed by
/// [`JsonLinesExporter::finish`]. The filename embeds the source tag and the
/// run's start timestamp so repeated runs never collide.
#[derive(Debug)]
pub struct JsonLinesExporter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl JsonLinesExporter {
    pub fn open(output_dir: &Path, source: &str) -> Result<Self, ExportError> {
        ensure_output_dir(output_dir)?;
        let started = Utc::now().format("%Y%m%d_%H%M%S");
        let path = output_dir.join(format!("{source}_{started}.jsonl"));
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Appends one item as a full line. The line is serialized in memory
    /// first; a failing item writes nothing at all to the stream.
    pub fn export(&mut self, item: &CatalogItem) -> Result<(), ExportError> {
        let line = serde_json::to_string(item)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes and closes the stream, returning its path.
    pub fn finish(mut self) -> Result<PathBuf, ExportError> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
