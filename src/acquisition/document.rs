// src/acquisition/document.rs
use std::io::{self, Read, Write};
use std::path::Path;

use tempfile::TempPath;

/// An uploaded document backed by a temp file this value exclusively owns.
///
/// The file is deleted exactly once: by `discard()` or, on any other exit path, on drop.
#[derive(Debug)]
pub struct Document {
    path: TempPath,
    label: String, // Original file name, for logs and output naming
}

impl Document {
    /// Writes `bytes` into a fresh temp file.
    pub fn from_bytes(bytes: &[u8], label: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("syllabus-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!("Stored '{}' ({} bytes) at {}", label, bytes.len(), file.path().display());
        Ok(Self {
            path: file.into_temp_path(),
            label: label.to_string(),
        })
    }

    /// Streams `reader` into a fresh temp file.
    pub fn from_reader<R: Read>(reader: &mut R, label: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("syllabus-")
            .suffix(".pdf")
            .tempfile()?;
        let written = io::copy(reader, &mut file)?;
        file.flush()?;

        tracing::debug!("Stored '{}' ({} bytes) at {}", label, written, file.path().display());
        Ok(Self {
            path: file.into_temp_path(),
            label: label.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Deletes the backing file now, logging instead of failing if that is not possible.
    pub fn discard(self) {
        let path = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => tracing::debug!("Removed temp document {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove temp document {}: {}", path.display(), e),
        }
    }
}
