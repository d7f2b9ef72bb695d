//! Repository sink contract.

use kmirror_core::{RepositoryDescriptor, RepositorySlug};

use crate::error::SinkError;

/// Outcome of a read against the sink.
///
/// Keeps "the thing is not there" apart from "the read itself failed", so
/// callers can create on `NotFound` and abort on `Other`.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Other(SinkError),
}

/// Stored state of a tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    /// Content-addressing token required to update the file in place.
    pub sha: String,
}

/// Create/read/update primitives on repositories owned by the authenticated
/// identity.
pub trait RepositorySink {
    fn get_repo(&self, name: &RepositorySlug) -> Lookup<RepositoryDescriptor>;

    /// Create a public repository without an initial commit.
    fn create_repo(
        &self,
        name: &RepositorySlug,
        description: &str,
    ) -> Result<RepositoryDescriptor, SinkError>;

    fn get_file(&self, repo: &RepositoryDescriptor, path: &str) -> Lookup<FileState>;

    fn create_file(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), SinkError>;

    fn update_file(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
        sha: &str,
    ) -> Result<(), SinkError>;
}
