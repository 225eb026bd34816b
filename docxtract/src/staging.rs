//! Per-request staging of uploaded documents.
//!
//! Each accepted upload is streamed into its own uniquely named temporary file so the
//! extractors can open it by path. The file lives exactly as long as the [`StagedDocument`]:
//! dropping it, on any exit path, removes the file from disk.

use crate::config::StagingConfig;
use std::{
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;

/// A temporary file holding one uploaded document.
#[derive(Debug)]
pub struct StagedDocument {
    file: NamedTempFile,
    len: u64,
}

impl StagedDocument {
    /// Allocate a new, empty staging file named `<prefix>XXXXXX<suffix>`.
    pub fn create(config: &StagingConfig) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.prefix).suffix(&config.suffix);

        let file = match &config.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        Ok(Self { file, len: 0 })
    }

    /// Append a chunk of the upload.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered data so the file can be reopened by path.
    pub fn finish(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of bytes written so far
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove the file now, reporting any removal error instead of ignoring it as `Drop` does.
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}
