//! Tera rendering engine for the repository README.
//!
//! The embedded template is baked into the binary. A user directory may
//! supply `readme.md.tera` to replace it wholesale.

use std::path::Path;

use tera::Tera;

use crate::context::ReadmeContext;
use crate::error::RenderError;

/// Template name, also the override file name looked up in a user directory.
pub const README_TEMPLATE: &str = "readme.md.tera";

const EMBEDDED_README: &str = include_str!("templates/readme.md.tera");

fn load_user_template(dir: &Path) -> Result<Option<String>, RenderError> {
    let path = dir.join(README_TEMPLATE);
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| RenderError::Io { path, source })
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let body = match user_template_dir {
        Some(dir) => load_user_template(dir)?.unwrap_or_else(|| EMBEDDED_README.to_string()),
        None => EMBEDDED_README.to_string(),
    };
    let mut tera = Tera::default();
    tera.add_raw_template(README_TEMPLATE, &body)?;
    Ok(tera)
}

/// Renders `README.md` content. Create once and reuse across notebooks.
pub struct ReadmeRenderer {
    tera: Tera,
}

impl ReadmeRenderer {
    /// Renderer with the embedded template.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template_dir(None)
    }

    /// Renderer that prefers `<dir>/readme.md.tera` when it exists.
    pub fn with_template_dir(dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(ReadmeRenderer {
            tera: build_tera(dir)?,
        })
    }

    /// Render the README. Line endings are normalised to LF.
    pub fn render(&self, ctx: &ReadmeContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let rendered = self.tera.render(README_TEMPLATE, &tera_ctx)?;
        Ok(rendered.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
