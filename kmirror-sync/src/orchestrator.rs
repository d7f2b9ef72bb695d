//! Sync orchestration: one sequential pass over a user's notebooks.
//!
//! Per notebook: slug → scratch dir → download → README → reconcile.
//! Any failure inside that sequence is recorded as the notebook's outcome and
//! the loop moves on; only a listing failure aborts the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tempfile::TempDir;

use kmirror_core::{
    slugify, Artifact, NotebookRef, RepositorySlug, SummaryReport, SyncOutcome, SyncResult,
};
use kmirror_renderer::{ReadmeContext, ReadmeRenderer};

use crate::error::{io_err, ReconcileError, SourceError, SyncError};
use crate::reconcile::{reconcile, Reconciled};
use crate::reporter::{SyncEvent, SyncReporter};
use crate::sink::RepositorySink;
use crate::source::NotebookSource;

const SCRATCH_PREFIX: &str = "kmirror-";

/// Description used for new repositories and the README paragraph.
pub fn repository_description(title: &str) -> String {
    format!("Kaggle notebook: {title}")
}

// ---------------------------------------------------------------------------
// Dry-run plan
// ---------------------------------------------------------------------------

/// What a run would do for one notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSync {
    pub title: String,
    pub kernel_ref: String,
    pub slug: RepositorySlug,
    pub source_url: String,
    /// Another notebook in the same listing maps to the same slug.
    pub collides: bool,
}

/// List notebooks and compute their slugs without downloading or pushing.
pub fn plan(source: &dyn NotebookSource, owner: &str) -> Result<Vec<PlannedSync>, SyncError> {
    let notebooks = source.list_notebooks(owner).map_err(SyncError::List)?;

    let slugs: Vec<RepositorySlug> = notebooks.iter().map(|n| slugify(&n.title)).collect();
    let mut seen: HashMap<&RepositorySlug, usize> = HashMap::new();
    for slug in &slugs {
        *seen.entry(slug).or_default() += 1;
    }

    Ok(notebooks
        .iter()
        .zip(slugs.iter())
        .map(|(notebook, slug)| PlannedSync {
            title: notebook.title.clone(),
            kernel_ref: notebook.kernel_ref(),
            slug: slug.clone(),
            source_url: notebook.source_url(),
            collides: seen.get(slug).copied().unwrap_or(0) > 1,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Per-notebook failure
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Failure {
    kind: SyncOutcome,
    reason: String,
}

impl Failure {
    fn download(reason: impl Into<String>) -> Self {
        Self {
            kind: SyncOutcome::DownloadFailed,
            reason: reason.into(),
        }
    }
}

impl From<ReconcileError> for Failure {
    fn from(err: ReconcileError) -> Self {
        let kind = match err {
            ReconcileError::Repo(_) => SyncOutcome::RepoError,
            ReconcileError::Push { .. } => SyncOutcome::PushFailed,
        };
        Self {
            kind,
            reason: err.to_string(),
        }
    }
}

fn load_artifact(path: &Path) -> Result<Artifact, SourceError> {
    let content = std::fs::read(path).map_err(|e| io_err(path, e))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            SourceError::Parse(format!("artifact path has no file name: {}", path.display()))
        })?;
    Ok(Artifact { filename, content })
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives a full sync pass against a source and a sink.
pub struct Orchestrator<'a> {
    source: &'a dyn NotebookSource,
    sink: &'a dyn RepositorySink,
    renderer: &'a ReadmeRenderer,
    reporter: &'a dyn SyncReporter,
    scratch_root: Option<PathBuf>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        source: &'a dyn NotebookSource,
        sink: &'a dyn RepositorySink,
        renderer: &'a ReadmeRenderer,
        reporter: &'a dyn SyncReporter,
    ) -> Self {
        Self {
            source,
            sink,
            renderer,
            reporter,
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    /// Sync every notebook owned by `owner`, in listing order.
    ///
    /// Returns `Err` only when the listing itself fails; per-notebook
    /// failures are recorded in the report.
    pub fn run(&self, owner: &str) -> Result<SummaryReport, SyncError> {
        let started_at = Utc::now();
        let notebooks = self.source.list_notebooks(owner).map_err(SyncError::List)?;
        let total = notebooks.len();
        self.reporter.report(&SyncEvent::RunStarted { total });

        let mut results = Vec::with_capacity(total);
        for (i, notebook) in notebooks.iter().enumerate() {
            let slug = slugify(&notebook.title);
            self.reporter.report(&SyncEvent::NotebookStarted {
                index: i + 1,
                total,
                title: notebook.title.clone(),
                slug: slug.clone(),
            });

            let result = match self.sync_notebook(notebook, &slug) {
                Ok(done) => {
                    self.reporter.report(&SyncEvent::NotebookSucceeded {
                        title: notebook.title.clone(),
                        full_identifier: done.repository.full_identifier.clone(),
                        created: done.created_repository(),
                    });
                    SyncResult {
                        title: notebook.title.clone(),
                        slug,
                        outcome: SyncOutcome::Succeeded,
                        repository: Some(done.repository.full_identifier),
                        detail: None,
                    }
                }
                Err(failure) => {
                    tracing::warn!(
                        "skipping {}: {}: {}",
                        notebook.kernel_ref(),
                        failure.kind,
                        failure.reason
                    );
                    self.reporter.report(&SyncEvent::NotebookFailed {
                        title: notebook.title.clone(),
                        kind: failure.kind,
                        reason: failure.reason.clone(),
                    });
                    SyncResult {
                        title: notebook.title.clone(),
                        slug,
                        outcome: failure.kind,
                        repository: None,
                        detail: Some(failure.reason),
                    }
                }
            };
            results.push(result);
        }

        let report = SummaryReport::new(results, started_at);
        self.reporter.report(&SyncEvent::RunFinished {
            total: report.total,
            succeeded: report.succeeded,
        });
        Ok(report)
    }

    /// One notebook. The scratch directory lives exactly as long as this call.
    fn sync_notebook(
        &self,
        notebook: &NotebookRef,
        slug: &RepositorySlug,
    ) -> Result<Reconciled, Failure> {
        let scratch = self
            .scratch_dir()
            .map_err(|e| Failure::download(format!("cannot create scratch directory: {e}")))?;

        let path = match self.source.download(notebook, scratch.path()) {
            Ok(Some(path)) => path,
            Ok(None) => return Err(Failure::download("download produced no notebook file")),
            Err(e) => return Err(Failure::download(e.to_string())),
        };
        let artifact = load_artifact(&path).map_err(|e| Failure::download(e.to_string()))?;

        let description = repository_description(&notebook.title);
        let ctx = ReadmeContext::for_notebook(notebook, Some(description.clone()));
        let readme = self.renderer.render(&ctx).map_err(|e| Failure {
            kind: SyncOutcome::PushFailed,
            reason: format!("cannot render README: {e}"),
        })?;

        let done = reconcile(self.sink, slug, &description, &artifact, &readme)?;

        if let Err(e) = scratch.close() {
            tracing::warn!("failed to remove scratch directory: {e}");
        }
        Ok(done)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
