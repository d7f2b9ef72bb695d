//! Notebook source contract.

use std::path::{Path, PathBuf};

use kmirror_core::NotebookRef;

use crate::error::SourceError;

/// Lists notebooks and fetches their packaged artifact.
pub trait NotebookSource {
    /// All notebooks owned by `owner`, in the order the platform returns them.
    fn list_notebooks(&self, owner: &str) -> Result<Vec<NotebookRef>, SourceError>;

    /// Download `notebook` into `dest_dir`.
    ///
    /// `Ok(None)` means the download ran but produced no artifact file.
    fn download(
        &self,
        notebook: &NotebookRef,
        dest_dir: &Path,
    ) -> Result<Option<PathBuf>, SourceError>;
}
