//! GitHub repository sink over the REST API (blocking `ureq`).
//!
//! # Endpoints
//!
//! | operation     | request                                          |
//! |---------------|--------------------------------------------------|
//! | identity      | `GET  /user`                                     |
//! | `get_repo`    | `GET  /repos/{login}/{name}`                     |
//! | `create_repo` | `POST /user/repos`                               |
//! | `get_file`    | `GET  /repos/{login}/{name}/contents/{path}`     |
//! | writes        | `PUT  /repos/{login}/{name}/contents/{path}`     |
//!
//! HTTP 404 on a read is [`Lookup::NotFound`]; every other failure is
//! [`Lookup::Other`] or an `Err`.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use kmirror_core::{GithubCredentials, RepositoryDescriptor, RepositorySlug};
use kmirror_sync::{FileState, Lookup, RepositorySink, SinkError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// ASCII set for encoding a single path segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT_ENCODE_SET).to_string()
}

/// Encode each `/`-separated segment of a repository file path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UserBody {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoBody {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateRepoBody<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Debug, Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn sink_error(err: ureq::Error) -> SinkError {
    match err {
        ureq::Error::Status(code, response) => {
            let status_text = response.status_text().to_string();
            let message = response
                .into_json::<ErrorBody>()
                .map(|b| b.message)
                .unwrap_or(status_text);
            SinkError::Status { code, message }
        }
        ureq::Error::Transport(t) => SinkError::Transport(t.to_string()),
    }
}

fn decode<T: DeserializeOwned>(response: ureq::Response) -> Result<T, SinkError> {
    response
        .into_json::<T>()
        .map_err(|e| SinkError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// GithubSink
// ---------------------------------------------------------------------------

/// [`RepositorySink`] for repositories owned by the token's user.
pub struct GithubSink {
    agent: ureq::Agent,
    api_url: String,
    token: String,
    login: String,
}

impl GithubSink {
    /// Build the HTTP agent and resolve the authenticated login via `GET /user`.
    pub fn connect(credentials: &GithubCredentials) -> Result<Self, SinkError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .user_agent(concat!("kmirror/", env!("CARGO_PKG_VERSION")))
            .build();
        let mut sink = Self {
            agent,
            api_url: credentials.api_url.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            login: String::new(),
        };

        let user: UserBody = sink
            .request("GET", "/user")
            .call()
            .map_err(sink_error)
            .and_then(decode)?;
        tracing::info!("authenticated to GitHub as {}", user.login);
        sink.login = user.login;
        Ok(sink)
    }

    /// Login of the authenticated user; owner of every repository touched.
    pub fn login(&self) -> &str {
        &self.login
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}{}", self.api_url, path))
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION)
    }

    fn repo_path(&self, name: &RepositorySlug) -> String {
        format!(
            "/repos/{}/{}",
            encode_segment(&self.login),
            encode_segment(name.as_str())
        )
    }

    fn contents_path(&self, repo: &RepositoryDescriptor, path: &str) -> String {
        format!("{}/contents/{}", self.repo_path(&repo.name), encode_path(path))
    }

    /// GET that maps 404 to [`Lookup::NotFound`].
    fn lookup<T: DeserializeOwned>(&self, path: &str) -> Lookup<T> {
        match self.request("GET", path).call() {
            Ok(response) => match decode(response) {
                Ok(body) => Lookup::Found(body),
                Err(e) => Lookup::Other(e),
            },
            Err(ureq::Error::Status(404, _)) => Lookup::NotFound,
            Err(e) => Lookup::Other(sink_error(e)),
        }
    }

    fn put_contents(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
        sha: Option<&str>,
    ) -> Result<(), SinkError> {
        let body = PutContentsBody {
            message,
            content: STANDARD.encode(content),
            sha,
        };
        self.request("PUT", &self.contents_path(repo, path))
            .send_json(&body)
            .map_err(sink_error)?;
        Ok(())
    }
}

impl RepositorySink for GithubSink {
    fn get_repo(&self, name: &RepositorySlug) -> Lookup<RepositoryDescriptor> {
        match self.lookup::<RepoBody>(&self.repo_path(name)) {
            Lookup::Found(body) => Lookup::Found(RepositoryDescriptor {
                name: name.clone(),
                exists: true,
                full_identifier: body.full_name,
            }),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Other(e) => Lookup::Other(e),
        }
    }

    fn create_repo(
        &self,
        name: &RepositorySlug,
        description: &str,
    ) -> Result<RepositoryDescriptor, SinkError> {
        let body = CreateRepoBody {
            name: name.as_str(),
            description,
            private: false,
            auto_init: false,
        };
        let created: RepoBody = self
            .request("POST", "/user/repos")
            .send_json(&body)
            .map_err(sink_error)
            .and_then(decode)?;
        Ok(RepositoryDescriptor {
            name: name.clone(),
            exists: false,
            full_identifier: created.full_name,
        })
    }

    fn get_file(&self, repo: &RepositoryDescriptor, path: &str) -> Lookup<FileState> {
        match self.lookup::<ContentBody>(&self.contents_path(repo, path)) {
            Lookup::Found(body) => Lookup::Found(FileState { sha: body.sha }),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Other(e) => Lookup::Other(e),
        }
    }

    fn create_file(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), SinkError> {
        self.put_contents(repo, path, content, message, None)
    }

    fn update_file(
        &self,
        repo: &RepositoryDescriptor,
        path: &str,
        content: &[u8],
        message: &str,
        sha: &str,
    ) -> Result<(), SinkError> {
        self.put_contents(repo, path, content, message, Some(sha))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_are_encoded_but_separators_kept() {
        assert_eq!(encode_path("README.md"), "README.md");
        assert_eq!(encode_path("my notebook.ipynb"), "my%20notebook.ipynb");
        assert_eq!(encode_path("data/50%#1.csv"), "data/50%25%231.csv");
    }

    #[test]
    fn non_ascii_names_are_utf8_encoded() {
        assert_eq!(encode_segment("çalışma.ipynb"), "%C3%A7al%C4%B1%C5%9Fma.ipynb");
    }

    #[test]
    fn update_body_carries_sha_and_base64_content() {
        let body = PutContentsBody {
            message: "Update README.md",
            content: STANDARD.encode(b"# EDA\n"),
            sha: Some("abc123"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Update README.md",
                "content": "IyBFREEK",
                "sha": "abc123",
            })
        );
    }

    #[test]
    fn create_body_omits_sha() {
        let body = PutContentsBody {
            message: "Add README.md",
            content: STANDARD.encode(b""),
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
    }
}
