//! Domain types for a mirror run.
//!
//! Everything here is constructed fresh per run; nothing is persisted between
//! runs, so repository state is always re-read from the sink.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base URL for canonical Kaggle notebook links.
pub const KAGGLE_CODE_URL: &str = "https://www.kaggle.com/code";

/// Substituted when a title yields no usable slug characters.
pub const FALLBACK_SLUG: &str = "notebook";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Repository name derived from a notebook title.
///
/// Always lowercase ASCII `[a-z0-9-]+` without leading or trailing hyphens.
/// Only [`crate::slugify`] constructs one, so the invariant holds for every
/// value in circulation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RepositorySlug(String);

impl RepositorySlug {
    pub(crate) fn new_unchecked(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the title produced nothing and the fallback was used.
    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_SLUG
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for RepositorySlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Notebook side
// ---------------------------------------------------------------------------

/// One notebook as listed by the source platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookRef {
    pub owner: String,
    pub slug_on_source: String,
    /// Free-form title; may be empty and may collide with other titles.
    pub title: String,
}

impl NotebookRef {
    pub fn new(
        owner: impl Into<String>,
        slug_on_source: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            slug_on_source: slug_on_source.into(),
            title: title.into(),
        }
    }

    /// Parse a Kaggle kernel ref of the form `owner/slug`.
    ///
    /// Returns `None` when either half is missing.
    pub fn from_kernel_ref(kernel_ref: &str, title: impl Into<String>) -> Option<Self> {
        let (owner, slug) = kernel_ref.trim().split_once('/')?;
        if owner.is_empty() || slug.is_empty() || slug.contains('/') {
            return None;
        }
        Some(Self::new(owner, slug, title))
    }

    /// `owner/slug`, the identifier the Kaggle CLI expects.
    pub fn kernel_ref(&self) -> String {
        format!("{}/{}", self.owner, self.slug_on_source)
    }

    /// Canonical public URL of the notebook.
    pub fn source_url(&self) -> String {
        format!("{KAGGLE_CODE_URL}/{}/{}", self.owner, self.slug_on_source)
    }
}

/// A downloaded notebook file, held in memory after leaving scratch storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name as produced by the source (e.g. `my-analysis.ipynb`).
    pub filename: String,
    pub content: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Repository side
// ---------------------------------------------------------------------------

/// Handle to a sink repository, resolved per reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    pub name: RepositorySlug,
    /// `true` if the repository was found by lookup, `false` if just created.
    pub exists: bool,
    /// `owner/name`.
    pub full_identifier: String,
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Per-notebook outcome of a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Succeeded,
    DownloadFailed,
    RepoError,
    PushFailed,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Succeeded)
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Succeeded => write!(f, "succeeded"),
            SyncOutcome::DownloadFailed => write!(f, "download failed"),
            SyncOutcome::RepoError => write!(f, "repository error"),
            SyncOutcome::PushFailed => write!(f, "push failed"),
        }
    }
}

/// Result recorded for one notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub title: String,
    pub slug: RepositorySlug,
    pub outcome: SyncOutcome,
    /// `owner/name` of the target repository, once it is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Human-readable failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub total: usize,
    pub succeeded: usize,
    pub results: Vec<SyncResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SummaryReport {
    /// Build a report from per-notebook results, stamping `finished_at` now.
    pub fn new(results: Vec<SyncResult>, started_at: DateTime<Utc>) -> Self {
        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            results,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// Outcomes in listing order.
    pub fn outcomes(&self) -> Vec<SyncOutcome> {
        self.results.iter().map(|r| r.outcome).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
