use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("media directory missing or not writable: {0}")]
    MediaDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::MediaDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::MediaDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::MediaDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::MediaDir(e.to_string()))?;
    Ok(())
}

/// A stored media asset: where it landed and the checksum of its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub path: PathBuf,
    pub checksum: String,
}

/// Writes media assets under a root directory, atomically (temp file then
/// rename) so an interrupted write never leaves a partial asset behind.
#[derive(Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn open(root: PathBuf) -> Result<Self, PersistError> {
        ensure_output_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists the bytes as `{root}/{filename}` and returns the final path
    /// with a SHA-256 checksum of the content.
    pub fn store(&self, filename: &str, bytes: &[u8]) -> Result<StoredAsset, PersistError> {
        let target = self.root.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace an existing asset so re-acquisition stays deterministic.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;

        Ok(StoredAsset {
            path: target,
            checksum: content_checksum(bytes),
        })
    }
}

fn content_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
