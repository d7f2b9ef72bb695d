//! Repository reconciliation.
//!
//! ## Protocol: read before every write
//!
//! 1. Look the repository up by slug.
//!    `Found` → reuse; `NotFound` → create (public, no initial commit);
//!    anything else → [`ReconcileError::Repo`], nothing is created.
//! 2. For the artifact, then `README.md`: read the stored file state.
//!    `Found` → update with its sha; `NotFound` → create;
//!    anything else → [`ReconcileError::Push`].
//!
//! Nothing is cached between calls, so every run re-reads remote state and a
//! repeated run converges to updates instead of duplicate creates.

use kmirror_core::{Artifact, RepositoryDescriptor, RepositorySlug};

use crate::error::{ReconcileError, SinkError};
use crate::sink::{Lookup, RepositorySink};

/// Fixed name of the generated description file.
pub const README_PATH: &str = "README.md";

// ---------------------------------------------------------------------------
// File write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWrite {
    /// File did not exist and was created.
    Created { path: String },
    /// File existed and was updated in place.
    Updated { path: String },
}

/// Outcome of reconciling one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub repository: RepositoryDescriptor,
    /// Artifact first, then README.
    pub writes: Vec<FileWrite>,
}

impl Reconciled {
    /// `true` when the repository was created by this call.
    pub fn created_repository(&self) -> bool {
        !self.repository.exists
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn ensure_repository(
    sink: &dyn RepositorySink,
    slug: &RepositorySlug,
    description: &str,
) -> Result<RepositoryDescriptor, ReconcileError> {
    match sink.get_repo(slug) {
        Lookup::Found(repo) => {
            tracing::info!("repository {} exists, updating", repo.full_identifier);
            Ok(repo)
        }
        Lookup::NotFound => {
            let repo = sink
                .create_repo(slug, description)
                .map_err(ReconcileError::Repo)?;
            tracing::info!("created repository {}", repo.full_identifier);
            Ok(repo)
        }
        Lookup::Other(err) => Err(ReconcileError::Repo(err)),
    }
}

/// Create or update a single file, re-reading its state first.
fn upsert_file(
    sink: &dyn RepositorySink,
    repo: &RepositoryDescriptor,
    path: &str,
    content: &[u8],
) -> Result<FileWrite, ReconcileError> {
    let push_err = |source: SinkError| ReconcileError::Push {
        path: path.to_string(),
        source,
    };

    match sink.get_file(repo, path) {
        Lookup::Found(state) => {
            sink.update_file(repo, path, content, &format!("Update {path}"), &state.sha)
                .map_err(push_err)?;
            tracing::debug!("updated: {}/{}", repo.full_identifier, path);
            Ok(FileWrite::Updated {
                path: path.to_string(),
            })
        }
        Lookup::NotFound => {
            sink.create_file(repo, path, content, &format!("Add {path}"))
                .map_err(push_err)?;
            tracing::debug!("created: {}/{}", repo.full_identifier, path);
            Ok(FileWrite::Created {
                path: path.to_string(),
            })
        }
        Lookup::Other(err) => Err(push_err(err)),
    }
}

// ---------------------------------------------------------------------------
// reconcile
// ---------------------------------------------------------------------------

/// Make the repository `slug` exist and hold the latest artifact and README.
///
/// `description` is used only when the repository has to be created.
/// The README is not attempted if the artifact push fails.
pub fn reconcile(
    sink: &dyn RepositorySink,
    slug: &RepositorySlug,
    description: &str,
    artifact: &Artifact,
    readme: &str,
) -> Result<Reconciled, ReconcileError> {
    let repository = ensure_repository(sink, slug, description)?;

    let writes = vec![
        upsert_file(sink, &repository, &artifact.filename, &artifact.content)?,
        upsert_file(sink, &repository, README_PATH, readme.as_bytes())?,
    ];

    Ok(Reconciled { repository, writes })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailOn, MemorySink, SinkCall};
    use kmirror_core::slugify;

    fn artifact() -> Artifact {
        Artifact {
            filename: "eda.ipynb".to_string(),
            content: br#"{"cells":[]}"#.to_vec(),
        }
    }

    #[test]
    fn fresh_repository_is_created_with_both_files() {
        let sink = MemorySink::new("ada");
        let slug = slugify("EDA");
        let out = reconcile(&sink, &slug, "Kaggle notebook: EDA", &artifact(), "# EDA\n")
            .expect("reconcile");

        assert!(out.created_repository());
        assert_eq!(out.repository.full_identifier, "ada/eda");
        assert_eq!(
            out.writes,
            vec![
                FileWrite::Created {
                    path: "eda.ipynb".into()
                },
                FileWrite::Created {
                    path: README_PATH.into()
                },
            ]
        );
        assert_eq!(sink.repo_description("eda").as_deref(), Some("Kaggle notebook: EDA"));
        assert_eq!(sink.file("eda", README_PATH).as_deref(), Some(&b"# EDA\n"[..]));
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::GetRepo("eda".into()),
                SinkCall::CreateRepo("eda".into()),
                SinkCall::GetFile {
                    repo: "eda".into(),
                    path: "eda.ipynb".into()
                },
                SinkCall::CreateFile {
                    repo: "eda".into(),
                    path: "eda.ipynb".into(),
                    message: "Add eda.ipynb".into()
                },
                SinkCall::GetFile {
                    repo: "eda".into(),
                    path: README_PATH.into()
                },
                SinkCall::CreateFile {
                    repo: "eda".into(),
                    path: README_PATH.into(),
                    message: "Add README.md".into()
                },
            ]
        );
    }

    #[test]
    fn second_run_updates_instead_of_creating() {
        let sink = MemorySink::new("ada");
        let slug = slugify("EDA");
        reconcile(&sink, &slug, "d", &artifact(), "# EDA\n").expect("first");
        let before = sink.file("eda", "eda.ipynb");
        sink.clear_calls();

        let out = reconcile(&sink, &slug, "d", &artifact(), "# EDA\n").expect("second");

        assert!(!out.created_repository());
        assert!(out.writes.iter().all(|w| matches!(w, FileWrite::Updated { .. })));
        assert_eq!(sink.count_calls(|c| matches!(c, SinkCall::CreateRepo(_))), 0);
        assert_eq!(sink.count_calls(|c| matches!(c, SinkCall::CreateFile { .. })), 0);
        assert_eq!(sink.count_calls(|c| matches!(c, SinkCall::UpdateFile { .. })), 2);
        assert!(sink.calls().contains(&SinkCall::UpdateFile {
            repo: "eda".into(),
            path: "eda.ipynb".into(),
            message: "Update eda.ipynb".into(),
        }));
        assert_eq!(sink.file("eda", "eda.ipynb"), before);
        assert_eq!(sink.repo_names(), vec!["eda".to_string()]);
    }

    #[test]
    fn existing_repository_missing_readme_gets_mixed_writes() {
        let sink = MemorySink::new("ada");
        sink.seed_repo("eda", &[("eda.ipynb", b"old")]);
        let out = reconcile(&sink, &slugify("EDA"), "d", &artifact(), "# EDA\n").expect("ok");
        assert_eq!(
            out.writes,
            vec![
                FileWrite::Updated {
                    path: "eda.ipynb".into()
                },
                FileWrite::Created {
                    path: README_PATH.into()
                },
            ]
        );
        assert_eq!(sink.file("eda", "eda.ipynb"), Some(artifact().content));
    }

    #[test]
    fn lookup_failure_is_repo_error_without_create() {
        let sink = MemorySink::new("ada");
        sink.fail_on(FailOn::GetRepo("eda".into()));
        let err = reconcile(&sink, &slugify("EDA"), "d", &artifact(), "r").unwrap_err();
        assert!(matches!(err, ReconcileError::Repo(_)), "got: {err}");
        assert_eq!(sink.count_calls(|c| matches!(c, SinkCall::CreateRepo(_))), 0);
        assert!(sink.repo_names().is_empty());
    }

    #[test]
    fn create_failure_is_repo_error() {
        let sink = MemorySink::new("ada");
        sink.fail_on(FailOn::CreateRepo("eda".into()));
        let err = reconcile(&sink, &slugify("EDA"), "d", &artifact(), "r").unwrap_err();
        assert!(matches!(err, ReconcileError::Repo(_)), "got: {err}");
        assert_eq!(sink.count_calls(|c| matches!(c, SinkCall::GetFile { .. })), 0);
    }

    #[test]
    fn artifact_write_failure_skips_readme() {
        let sink = MemorySink::new("ada");
        sink.fail_on(FailOn::Write {
            repo: "eda".into(),
            path: "eda.ipynb".into(),
        });
        let err = reconcile(&sink, &slugify("EDA"), "d", &artifact(), "r").unwrap_err();
        match err {
            ReconcileError::Push { path, .. } => assert_eq!(path, "eda.ipynb"),
            other => panic!("expected push error, got {other:?}"),
        }
        assert_eq!(
            sink.count_calls(
                |c| matches!(c, SinkCall::GetFile { path, .. } if path == README_PATH)
            ),
            0
        );
    }

    #[test]
    fn file_state_read_failure_is_push_error() {
        let sink = MemorySink::new("ada");
        sink.seed_repo("eda", &[]);
        sink.fail_on(FailOn::GetFile {
            repo: "eda".into(),
            path: README_PATH.into(),
        });
        let err = reconcile(&sink, &slugify("EDA"), "d", &artifact(), "r").unwrap_err();
        match err {
            ReconcileError::Push { path, .. } => assert_eq!(path, README_PATH),
            other => panic!("expected push error, got {other:?}"),
        }
        // The artifact write that preceded the failure stays in place.
        assert!(sink.file("eda", "eda.ipynb").is_some());
    }
}
