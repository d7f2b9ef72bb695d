//! # kmirror-renderer
//!
//! Tera-based renderer for the `README.md` placed in every mirrored
//! repository.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kmirror_core::NotebookRef;
//! use kmirror_renderer::{ReadmeContext, ReadmeRenderer};
//!
//! fn readme_for(notebook: &NotebookRef) -> Option<String> {
//!     let renderer = ReadmeRenderer::new().ok()?;
//!     let ctx = ReadmeContext::for_notebook(notebook, Some("Kaggle notebook".into()));
//!     renderer.render(&ctx).ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::ReadmeContext;
pub use engine::{ReadmeRenderer, README_TEMPLATE};
pub use error::RenderError;
