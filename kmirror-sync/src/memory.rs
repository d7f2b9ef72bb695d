//! In-memory [`RepositorySink`] for tests and local experiments.
//!
//! Records every call so tests can assert on the exact protocol, and can be
//! told to fail specific operations.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use kmirror_core::{RepositoryDescriptor, RepositorySlug};

use crate::error::SinkError;
use crate::sink::{FileState, Lookup, RepositorySink};

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    GetRepo(String),
    CreateRepo(String),
    GetFile { repo: String, path: String },
    CreateFile {
        repo: String,
        path: String,
        message: String,
    },
    UpdateFile {
        repo: String,
        path: String,
        message: String,
    },
}

/// Operation to fail with an injected error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailOn {
    GetRepo(String),
    CreateRepo(String),
    GetFile { repo: String, path: String },
    Write { repo: String, path: String },
}

#[derive(Debug, Clone)]
struct StoredFile {
    content: Vec<u8>,
    sha: String,
}

#[derive(Debug, Clone, Default)]
struct StoredRepo {
    description: String,
    files: BTreeMap<String, StoredFile>,
}

#[derive(Default)]
struct Inner {
    repos: BTreeMap<String, StoredRepo>,
    calls: Vec<SinkCall>,
    failures: HashSet<FailOn>,
    next_sha: u64,
}

impl Inner {
    fn mint_sha(&mut self) -> String {
        self.next_sha += 1;
        format!("{:040x}", self.next_sha)
    }
}

/// Sink that keeps repositories in a map.
pub struct MemorySink {
    owner: String,
    inner: Mutex<Inner>,
}

impl MemorySink {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn descriptor(&self, name: &RepositorySlug, exists: bool) -> RepositoryDescriptor {
        RepositoryDescriptor {
            name: name.clone(),
            exists,
            full_identifier: format!("{}/{}", self.owner, name),
        }
    }

    fn injected(&self, inner: &Inner, op: &FailOn) -> Option<SinkError> {
        inner.failures.contains(op).then(|| SinkError::Status {
            code: 500,
            message: format!("injected failure: {op:?}"),
        })
    }

    /// Make `op` fail with HTTP 500 from now on.
    pub fn fail_on(&self, op: FailOn) {
        self.lock().failures.insert(op);
    }

    /// Pre-populate an existing repository with files.
    pub fn seed_repo(&self, name: &str, files: &[(&str, &[u8])]) {
        let mut inner = self.lock();
        let mut repo = StoredRepo::default();
        for (path, content) in files {
            let sha = inner.mint_sha();
            repo.files.insert(
                (*path).to_string(),
                StoredFile {
                    content: content.to_vec(),
                    sha,
                },
            );
        }
        inner.repos.insert(name.to_string(), repo);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn repo_names(&self) -> Vec<String> {
        self.lock().repos.keys().cloned().collect()
    }

    pub fn repo_description(&self, repo: &str) -> Option<String> {
        self.lock().repos.get(repo).map(|r| r.description.clone())
    }

    pub fn file(&self, repo: &str, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .repos
            .get(repo)
            .and_then(|r| r.files.get(path))
            .map(|f| f.content.clone())
    }

    pub fn file_paths(&self, repo: &str) -> Vec<String> {
        self.lock()
            .repos
            .get(repo)
            .map(|r| r.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&SinkCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

impl RepositorySink for MemorySink {
    fn get_repo(&self, name: &RepositorySlug) -> Lookup<RepositoryDescriptor> {
        let mut inner = self.lock();
        inner.calls.push(SinkCall::GetRepo(name.to_string()));
        if let Some(err) = self.injected(&inner, &FailOn::GetRepo(name.to_string())) {
            return Lookup::Other(err);
        }
        if !inner.repos.contains_key(name.as_str()) {
            return Lookup::NotFound;
        }
        Lookup::Found(self.descriptor(name, true))
    }

    fn create_repo(
        &self,
        name: &RepositorySlug,
        description: &str,
    ) -> Result<RepositoryDescriptor, SinkError> {
        let mut inner = self.lock();
        inner.calls.push(SinkCall::CreateRepo(name.to_string()));
        if let Some(err) = self.injected(&inner, &FailOn::CreateRepo(name.to_string())) {
            return Err(err);
        }
        if inner.repos.contains_key(name.as_str()) {
            return Err(SinkError::Status {
                code: 422,
                message: "name already exists on this account".to_string(),
            });
        }
        inner.repos.insert(
            name.to_string(),
            StoredRepo {
                description: description.to_string(),
                files: BTreeMap::new(),
            },
        );
        Ok(self.descriptor(name, false))
    }

    fn get_file(&self, repo: &RepositoryDescriptor, path: &str) -> Lookup<FileState> {
        let mut inner = self.lock();
        let repo_name = repo.name.to_string();
        inner.calls.push(SinkCall::GetFile {
            repo: repo_name.clone(),
            path: path.to_string(),
        });
        let op = FailOn::GetFile {
            repo: repo_name.clone(),
            path: path.to_string(),
        };
        if let Some(err) = self.injected(&inner, &op) {
            return Lookup::Other(err);
        }
        match inner.repos.get(&repo_name).and_then(|r| r.files.get(path)) {
            Some(f) => Lookup::Found(FileState { sha: f.sha.clone() }),
            None => Lookup::NotFound,
        }
    }

    fn create_file(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), SinkError> {
        let mut inner = self.lock();
        let repo_name = repo.name.to_string();
        inner.calls.push(SinkCall::CreateFile {
            repo: repo_name.clone(),
            path: path.to_string(),
            message: message.to_string(),
        });
        let op = FailOn::Write {
            repo: repo_name.clone(),
            path: path.to_string(),
        };
        if let Some(err) = self.injected(&inner, &op) {
            return Err(err);
        }
        let sha = inner.mint_sha();
        let stored = inner.repos.get_mut(&repo_name).ok_or(SinkError::Status {
            code: 404,
            message: "Not Found".to_string(),
        })?;
        if stored.files.contains_key(path) {
            return Err(SinkError::Status {
                code: 422,
                message: "\"sha\" wasn't supplied.".to_string(),
            });
        }
        stored.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_vec(),
                sha,
            },
        );
        Ok(())
    }

    fn update_file(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
        sha: &str,
    ) -> Result<(), SinkError> {
        let mut inner = self.lock();
        let repo_name = repo.name.to_string();
        inner.calls.push(SinkCall::UpdateFile {
            repo: repo_name.clone(),
            path: path.to_string(),
            message: message.to_string(),
        });
        let op = FailOn::Write {
            repo: repo_name.clone(),
            path: path.to_string(),
        };
        if let Some(err) = self.injected(&inner, &op) {
            return Err(err);
        }
        let new_sha = inner.mint_sha();
        let file = inner
            .repos
            .get_mut(&repo_name)
            .and_then(|r| r.files.get_mut(path))
            .ok_or(SinkError::Status {
                code: 404,
                message: "Not Found".to_string(),
            })?;
        if file.sha != sha {
            return Err(SinkError::Status {
                code: 409,
                message: format!("{path} does not match {sha}"),
            });
        }
        file.content = content.to_vec();
        file.sha = new_sha;
        Ok(())
    }
}
