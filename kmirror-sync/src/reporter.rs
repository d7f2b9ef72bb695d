//! Structured progress events emitted by the orchestrator.

use std::sync::Mutex;

use kmirror_core::{RepositorySlug, SyncOutcome};

/// One progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    RunStarted {
        total: usize,
    },
    /// `index` is 1-based.
    NotebookStarted {
        index: usize,
        total: usize,
        title: String,
        slug: RepositorySlug,
    },
    NotebookSucceeded {
        title: String,
        full_identifier: String,
        /// The repository did not exist before this run.
        created: bool,
    },
    NotebookFailed {
        title: String,
        kind: SyncOutcome,
        reason: String,
    },
    RunFinished {
        total: usize,
        succeeded: usize,
    },
}

/// Receives progress events. Implementations must not affect control flow.
pub trait SyncReporter {
    fn report(&self, event: &SyncEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl SyncReporter for NullReporter {
    fn report(&self, _event: &SyncEvent) {}
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl SyncReporter for TracingReporter {
    fn report(&self, event: &SyncEvent) {
        match event {
            SyncEvent::RunStarted { total } => {
                tracing::info!("starting sync of {total} notebook(s)")
            }
            SyncEvent::NotebookStarted {
                index,
                total,
                title,
                slug,
            } => tracing::info!("[{index}/{total}] {title} -> {slug}"),
            SyncEvent::NotebookSucceeded {
                full_identifier,
                created,
                ..
            } => {
                let verb = if *created { "created" } else { "updated" };
                tracing::info!("{verb} {full_identifier}");
            }
            SyncEvent::NotebookFailed {
                title,
                kind,
                reason,
            } => tracing::warn!("{title}: {kind}: {reason}"),
            SyncEvent::RunFinished { total, succeeded } => {
                tracing::info!("sync complete: {succeeded}/{total}")
            }
        }
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl SyncReporter for RecordingReporter {
    fn report(&self, event: &SyncEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
