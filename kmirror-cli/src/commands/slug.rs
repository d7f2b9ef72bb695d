//! `kmirror slug`: offline preview of title → repository name.

use anyhow::Result;
use clap::Args;

use kmirror_core::slugify;

/// Arguments for `kmirror slug`.
#[derive(Args, Debug)]
pub struct SlugArgs {
    /// One or more notebook titles.
    #[arg(required = true)]
    pub titles: Vec<String>,
}

impl SlugArgs {
    pub fn run(self) -> Result<()> {
        for title in &self.titles {
            println!("{}", slugify(title));
        }
        Ok(())
    }
}
