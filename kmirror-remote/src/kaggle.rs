//! Kaggle notebook source backed by the official `kaggle` CLI.
//!
//! # Commands
//!
//! ```text
//! kaggle kernels list --mine --page-size 100 --csv
//! kaggle kernels pull <owner>/<slug> -p <dir> -m
//! ```
//!
//! Credentials are handed to the child as `KAGGLE_USERNAME` / `KAGGLE_KEY`, so
//! the CLI never has to find a `kaggle.json` of its own.

use std::path::{Path, PathBuf};
use std::process::Command;

use kmirror_core::{config, KaggleCredentials, NotebookRef};
use kmirror_sync::{NotebookSource, SourceError};

const PAGE_SIZE: &str = "100";
const NOTEBOOK_EXT: &str = "ipynb";

/// [`NotebookSource`] that shells out to the Kaggle CLI.
#[derive(Debug, Clone)]
pub struct KaggleCli {
    program: String,
    credentials: KaggleCredentials,
}

impl KaggleCli {
    /// Use the program named by `KMIRROR_KAGGLE_BIN`, or `kaggle`.
    pub fn new(credentials: KaggleCredentials) -> Self {
        Self::with_program(config::kaggle_bin(), credentials)
    }

    pub fn with_program(program: impl Into<String>, credentials: KaggleCredentials) -> Self {
        Self {
            program: program.into(),
            credentials,
        }
    }

    /// Run the CLI with `args` and return its stdout.
    fn run(&self, args: &[&str]) -> Result<String, SourceError> {
        tracing::debug!("running {} {}", self.program, args.join(" "));
        let output = Command::new(&self.program)
            .args(args)
            .env("KAGGLE_USERNAME", &self.credentials.username)
            .env("KAGGLE_KEY", &self.credentials.key)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Command {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl NotebookSource for KaggleCli {
    fn list_notebooks(&self, owner: &str) -> Result<Vec<NotebookRef>, SourceError> {
        let stdout = self.run(&[
            "kernels",
            "list",
            "--mine",
            "--page-size",
            PAGE_SIZE,
            "--csv",
        ])?;
        let notebooks = parse_kernel_list(&stdout)?;
        for n in notebooks.iter().filter(|n| n.owner != owner) {
            tracing::debug!("{} is owned by {}, not {owner}", n.kernel_ref(), n.owner);
        }
        tracing::info!("found {} notebook(s) for {owner}", notebooks.len());
        Ok(notebooks)
    }

    fn download(
        &self,
        notebook: &NotebookRef,
        dest_dir: &Path,
    ) -> Result<Option<PathBuf>, SourceError> {
        let kernel_ref = notebook.kernel_ref();
        let dest = dest_dir.to_string_lossy();
        self.run(&["kernels", "pull", &kernel_ref, "-p", &dest, "-m"])?;
        find_notebook_file(dest_dir)
    }
}

/// First `*.ipynb` in `dir` by file name.
fn find_notebook_file(dir: &Path) -> Result<Option<PathBuf>, SourceError> {
    let io = |source: std::io::Error| SourceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == NOTEBOOK_EXT) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found.into_iter().next())
}

// ---------------------------------------------------------------------------
// Listing parser
// ---------------------------------------------------------------------------

/// Parse the CSV printed by `kaggle kernels list --csv`.
///
/// The header is the first record naming both a `ref` and a `title` column;
/// notices the CLI prints before it (version warnings and the like) are
/// skipped. Output with no header is an empty listing, unless a record names
/// one of the two columns without the other. Rows whose `ref` is not
/// `owner/slug` are skipped with a warning.
pub fn parse_kernel_list(csv: &str) -> Result<Vec<NotebookRef>, SourceError> {
    let records: Vec<Vec<String>> = split_records(csv)?
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect();

    let header = records.iter().enumerate().find_map(|(at, r)| {
        Some((at, column(r, "ref")?, column(r, "title")?))
    });
    let Some((header_at, ref_col, title_col)) = header else {
        let partial = records
            .iter()
            .find(|r| column(r, "ref").is_some() || column(r, "title").is_some());
        return match partial {
            Some(r) => {
                let missing = if column(r, "ref").is_none() { "ref" } else { "title" };
                Err(SourceError::Parse(format!("missing `{missing}` column in header")))
            }
            None => Ok(Vec::new()),
        };
    };
    for notice in &records[..header_at] {
        tracing::warn!("skipping kaggle output before listing header: {}", notice.join(","));
    }

    let mut notebooks = Vec::with_capacity(records.len() - header_at - 1);
    for (line, row) in records.iter().enumerate().skip(header_at + 1) {
        let Some(kernel_ref) = row.get(ref_col) else {
            tracing::warn!("listing row {line} has no ref, skipping");
            continue;
        };
        let title = row.get(title_col).map(String::as_str).unwrap_or_default();
        match NotebookRef::from_kernel_ref(kernel_ref, title) {
            Some(n) => notebooks.push(n),
            None => {
                tracing::warn!("listing row {line} has malformed ref {kernel_ref:?}, skipping")
            }
        }
    }
    Ok(notebooks)
}

/// Position of the header cell `name`, ignoring case and padding.
fn column(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// RFC 4180 record splitter: quoted fields may hold commas, doubled quotes and
/// line breaks.
fn split_records(text: &str) -> Result<Vec<Vec<String>>, SourceError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SourceError::Parse("unterminated quoted field".to_string()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
ref,title,author,lastRunTime,totalVotes
ada/eda,EDA,Ada Lovelace,2024-03-01 10:00:00,4
ada/churn-model,\"Churn, Retention and \"\"LTV\"\"\",Ada Lovelace,2024-02-11 08:30:00,12
";

    #[test]
    fn listing_is_parsed_in_order() {
        let notebooks = parse_kernel_list(LISTING).expect("parse");
        assert_eq!(
            notebooks,
            vec![
                NotebookRef::new("ada", "eda", "EDA"),
                NotebookRef::new("ada", "churn-model", "Churn, Retention and \"LTV\""),
            ]
        );
    }

    #[test]
    fn header_only_or_blank_output_is_empty() {
        assert!(parse_kernel_list("").unwrap().is_empty());
        assert!(parse_kernel_list("\n\n").unwrap().is_empty());
        assert!(parse_kernel_list("ref,title\n").unwrap().is_empty());
        assert!(parse_kernel_list("No kernels found").unwrap().is_empty());
    }

    #[test]
    fn notices_before_the_header_are_skipped() {
        let listing = "\
Warning: Looks like you're using an outdated API Version, please consider updating
ref,title,author,lastRunTime,totalVotes
ada/eda,EDA,Ada,2024-03-01,4
";
        let notebooks = parse_kernel_list(listing).expect("parse");
        assert_eq!(notebooks, vec![NotebookRef::new("ada", "eda", "EDA")]);
    }

    #[test]
    fn notices_without_a_header_are_an_empty_listing() {
        let listing = "Warning: outdated API Version, please update\nNo kernels found\n";
        assert!(parse_kernel_list(listing).unwrap().is_empty());
    }

    #[test]
    fn title_is_kept_as_listed() {
        let notebooks = parse_kernel_list("ref,title\nada/eda,\"  EDA: first pass \"\n").unwrap();
        assert_eq!(notebooks, vec![NotebookRef::new("ada", "eda", "  EDA: first pass ")]);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let notebooks = parse_kernel_list("ref,title\r\nada/eda,EDA\r\n").unwrap();
        assert_eq!(notebooks, vec![NotebookRef::new("ada", "eda", "EDA")]);
    }

    #[test]
    fn column_order_follows_header() {
        let notebooks = parse_kernel_list("title,ref\nEDA,ada/eda\n").unwrap();
        assert_eq!(notebooks, vec![NotebookRef::new("ada", "eda", "EDA")]);
    }

    #[test]
    fn missing_title_column_is_a_parse_error() {
        let err = parse_kernel_list("ref,author\nada/eda,Ada\n").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)), "got: {err}");
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn malformed_refs_are_skipped() {
        let notebooks =
            parse_kernel_list("ref,title\nnot-a-ref,Broken\nada/ok,Fine\n/x,Nope\n").unwrap();
        assert_eq!(notebooks, vec![NotebookRef::new("ada", "ok", "Fine")]);
    }

    #[test]
    fn short_row_keeps_empty_title() {
        let notebooks = parse_kernel_list("ref,author,title\nada/eda,Ada\n").unwrap();
        assert_eq!(notebooks, vec![NotebookRef::new("ada", "eda", "")]);
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let records = split_records("a,\"b\nc\"\nd,e").unwrap();
        assert_eq!(records, vec![vec!["a", "b\nc"], vec!["d", "e"]]);
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = split_records("ref,title\nada/eda,\"EDA\n").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)), "got: {err}");
    }

    #[test]
    fn notebook_file_is_picked_by_sorted_name() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("kernel-metadata.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.ipynb"), "{}").unwrap();
        std::fs::write(dir.path().join("a.ipynb"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("0.ipynb")).unwrap();

        let found = find_notebook_file(dir.path()).unwrap();
        assert_eq!(found, Some(dir.path().join("a.ipynb")));
    }

    #[test]
    fn empty_directory_has_no_notebook() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(find_notebook_file(dir.path()).unwrap(), None);
    }
}
