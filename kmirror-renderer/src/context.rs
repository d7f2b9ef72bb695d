//! Template context: the serializable rendering payload built from a [`NotebookRef`].

use serde::{Deserialize, Serialize};

use kmirror_core::NotebookRef;

use crate::error::RenderError;

/// Rendering payload for `README.md`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeContext {
    /// Notebook title, used verbatim as the top-level heading.
    pub title: String,
    /// Optional paragraph under the heading.
    pub description: Option<String>,
    /// Canonical notebook URL on Kaggle.
    pub source_url: String,
    /// `owner/slug` on Kaggle.
    pub kernel_ref: String,
    pub meta: MetaCtx,
}

/// Generator info, available to user templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub kmirror_version: String,
}

impl ReadmeContext {
    /// Build a [`ReadmeContext`] from a listed notebook.
    ///
    /// An empty or whitespace-only `description` is dropped.
    pub fn for_notebook(notebook: &NotebookRef, description: Option<String>) -> Self {
        Self {
            title: notebook.title.clone(),
            description: description.filter(|d| !d.trim().is_empty()),
            source_url: notebook.source_url(),
            kernel_ref: notebook.kernel_ref(),
            meta: MetaCtx {
                kmirror_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Convert to a [`tera::Context`].
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        let value = serde_json::to_value(self)?;
        Ok(tera::Context::from_value(value)?)
    }
}
