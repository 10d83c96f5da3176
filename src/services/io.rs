//! Upload and output file handling
//!
//! Keeps file lifecycle concerns out of the pipeline: uploads live in scoped
//! temp files that are deleted on every exit path, outputs go under a
//! per-deployment directory with timestamped names.

use crate::error::{CutoutError, Result};
use crate::types::RemovalResult;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes composited PNGs under a designated output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    prefix: String,
}

impl OutputWriter {
    /// Create a writer for the given directory and filename prefix
    pub fn new<P: Into<PathBuf>, S: Into<String>>(dir: P, prefix: S) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if absent.
    ///
    /// `create_dir_all` succeeds when the directory already exists, so
    /// concurrent requests racing on first use are harmless.
    ///
    /// # Errors
    /// Returns `Io` when creation fails for reasons other than existence.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CutoutError::file_io_error("create output directory", &self.dir, e))
    }

    /// Next output path: prefix + unix-millis timestamp + `.png`.
    ///
    /// Timestamp naming keeps concurrent requests from overwriting each
    /// other under normal clock resolution.
    #[must_use]
    pub fn next_output_path(&self) -> PathBuf {
        let stamp = chrono::Utc::now().timestamp_millis();
        self.dir.join(format!("{}{stamp}.png", self.prefix))
    }

    /// Persist a removal result as PNG and return the path written
    ///
    /// # Errors
    /// Returns `Io`/`Image` errors from directory creation or encoding.
    pub fn write(&self, result: &RemovalResult) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.next_output_path();
        result.save_png(&path)?;
        debug!(path = %path.display(), "output written");
        Ok(path)
    }
}

/// Scoped temporary upload file.
///
/// Owns the uploaded bytes on disk for the duration of one request and
/// deletes the file when dropped, on success and failure paths alike.
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
}

impl TempUpload {
    /// Spill uploaded bytes to a uniquely named temp file
    ///
    /// # Errors
    /// Returns `Io` when the temp file cannot be created or written.
    pub fn write(bytes: &[u8]) -> Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), bytes = bytes.len(), "upload spilled to temp file");
        Ok(Self { file })
    }

    /// Path of the temporary file
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the uploaded bytes back
    ///
    /// # Errors
    /// Returns `Io` when the file cannot be read.
    pub fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(self.path())
            .map_err(|e| CutoutError::file_io_error("read uploaded file", self.path(), e))
    }
}
