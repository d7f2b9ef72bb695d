//! Error types for kmirror-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while resolving credentials and settings.
///
/// Every variant is fatal: the CLI reports it before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the environment nor `kaggle.json` supplied a username/key pair.
    #[error(
        "Kaggle credentials not found; set KAGGLE_USERNAME and KAGGLE_KEY or create {path}"
    )]
    MissingKaggle { path: PathBuf },

    /// `GITHUB_TOKEN` is unset or empty.
    #[error("GitHub token not found; set the GITHUB_TOKEN environment variable")]
    MissingGithubToken,

    /// `kaggle.json` exists but could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `kaggle.json` is not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::home_dir()` returned `None` and `KAGGLE_CONFIG_DIR` is unset.
    #[error("cannot determine home directory; set $HOME or KAGGLE_CONFIG_DIR")]
    HomeNotFound,
}
