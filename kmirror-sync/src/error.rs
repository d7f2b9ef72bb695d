//! Error types for kmirror-sync.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures reported by a [`crate::NotebookSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source program could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The source program ran and exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    Command {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Listing output could not be interpreted.
    #[error("unexpected listing output: {0}")]
    Parse(String),

    /// I/O failure in the scratch directory.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reported by a [`crate::RepositorySink`].
///
/// "Not found" is never an error here; lookups report it through
/// [`crate::Lookup::NotFound`].
#[derive(Debug, Error)]
pub enum SinkError {
    /// The remote answered with a non-success status.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with a body we could not decode.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Failures of a single reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Repository lookup (other than not-found) or creation failed.
    #[error("repository error: {0}")]
    Repo(#[source] SinkError),

    /// A tracked file could not be read or written.
    #[error("failed to push {path}: {source}")]
    Push {
        path: String,
        #[source]
        source: SinkError,
    },
}

/// Fatal errors that abort a whole run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The notebook listing could not be obtained.
    #[error("failed to list notebooks: {0}")]
    List(#[source] SourceError),
}

/// Convenience constructor for [`SourceError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SourceError {
    SourceError::Io {
        path: path.into(),
        source,
    }
}
