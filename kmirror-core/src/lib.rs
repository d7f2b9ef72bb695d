//! kmirror core library: domain types, slug generation, credentials, errors.
//!
//! Public API surface:
//! - [`types`]: notebook, repository and run-summary types
//! - [`slug`]: [`slugify`], the title → repository name function
//! - [`config`]: Kaggle / GitHub credential resolution
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod slug;
pub mod types;

pub use config::{GithubCredentials, KaggleCredentials};
pub use error::ConfigError;
pub use slug::slugify;
pub use types::{
    Artifact, NotebookRef, RepositoryDescriptor, RepositorySlug, SummaryReport, SyncOutcome,
    SyncResult,
};
