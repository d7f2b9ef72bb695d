//! # kmirror-remote
//!
//! Concrete collaborators for the sync pass:
//!
//! - [`KaggleCli`] drives the `kaggle` command-line tool as a
//!   [`NotebookSource`](kmirror_sync::NotebookSource).
//! - [`GithubSink`] talks to the GitHub REST API as a
//!   [`RepositorySink`](kmirror_sync::RepositorySink).

pub mod github;
pub mod kaggle;

pub use github::GithubSink;
pub use kaggle::{parse_kernel_list, KaggleCli};
