//! # kmirror-sync
//!
//! Source/sink contracts, repository reconciliation and sync orchestration.
//!
//! Call [`reconcile`] to upsert one repository, or build an [`Orchestrator`]
//! and [`Orchestrator::run`] it to mirror every notebook of a user.

pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod reconcile;
pub mod reporter;
pub mod sink;
pub mod source;

pub use error::{ReconcileError, SinkError, SourceError, SyncError};
pub use orchestrator::{plan, repository_description, Orchestrator, PlannedSync};
pub use reconcile::{reconcile, FileWrite, Reconciled, README_PATH};
pub use reporter::{NullReporter, RecordingReporter, SyncEvent, SyncReporter, TracingReporter};
pub use sink::{FileState, Lookup, RepositorySink};
pub use source::NotebookSource;
