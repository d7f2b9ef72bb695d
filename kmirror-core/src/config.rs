//! Credential and settings resolution.
//!
//! # Sources
//!
//! | Setting             | Source                                                        |
//! |---------------------|---------------------------------------------------------------|
//! | Kaggle username/key | `KAGGLE_USERNAME` + `KAGGLE_KEY`, else `kaggle.json`          |
//! | `kaggle.json` dir   | `KAGGLE_CONFIG_DIR`, else `~/.kaggle`                         |
//! | GitHub token        | `GITHUB_TOKEN`                                                |
//! | GitHub API base     | `GITHUB_API_URL`, default [`DEFAULT_GITHUB_API_URL`]          |
//! | Kaggle binary       | `KMIRROR_KAGGLE_BIN`, default [`DEFAULT_KAGGLE_BIN`]          |
//! | README template dir | `KMIRROR_TEMPLATE_DIR`, optional                              |
//!
//! # API pattern
//!
//! Every resolver has two forms:
//! - `fn_from(env, home)`: explicit environment lookup and home; used in tests
//! - `fn()`: reads the process environment and `dirs::home_dir()`
//!
//! Tests must never call the no-arg wrappers.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_KAGGLE_BIN: &str = "kaggle";
pub const KAGGLE_JSON: &str = "kaggle.json";

// ---------------------------------------------------------------------------
// Credential types
// ---------------------------------------------------------------------------

/// Kaggle API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct KaggleCredentials {
    pub username: String,
    pub key: String,
}

impl fmt::Debug for KaggleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KaggleCredentials")
            .field("username", &self.username)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// GitHub API access settings.
#[derive(Clone, PartialEq, Eq)]
pub struct GithubCredentials {
    pub token: String,
    /// API base without a trailing slash.
    pub api_url: String,
}

impl fmt::Debug for GithubCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubCredentials")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct KaggleJson {
    username: Option<String>,
    key: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up `name`, treating empty values as unset.
fn non_empty(env: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    env(name).filter(|v| !v.trim().is_empty())
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// `$KAGGLE_CONFIG_DIR/kaggle.json`, else `<home>/.kaggle/kaggle.json`.
pub fn kaggle_json_path_from(
    env: impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = non_empty(&env, "KAGGLE_CONFIG_DIR") {
        return Ok(PathBuf::from(dir).join(KAGGLE_JSON));
    }
    let home = home.ok_or(ConfigError::HomeNotFound)?;
    Ok(home.join(".kaggle").join(KAGGLE_JSON))
}

// ---------------------------------------------------------------------------
// Kaggle
// ---------------------------------------------------------------------------

/// Resolve Kaggle credentials.
///
/// The environment pair wins only when both halves are present; otherwise
/// both values are taken from `kaggle.json`. A missing file is not an error
/// by itself, but a malformed one is.
pub fn resolve_kaggle_from(
    env: impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
) -> Result<KaggleCredentials, ConfigError> {
    if let (Some(username), Some(key)) = (
        non_empty(&env, "KAGGLE_USERNAME"),
        non_empty(&env, "KAGGLE_KEY"),
    ) {
        return Ok(KaggleCredentials { username, key });
    }

    let path = kaggle_json_path_from(&env, home)?;
    if !path.exists() {
        return Err(ConfigError::MissingKaggle { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let parsed: KaggleJson = serde_json::from_str(&contents).map_err(|source| {
        ConfigError::Parse {
            path: path.clone(),
            source,
        }
    })?;

    match (
        parsed.username.filter(|v| !v.trim().is_empty()),
        parsed.key.filter(|v| !v.trim().is_empty()),
    ) {
        (Some(username), Some(key)) => Ok(KaggleCredentials { username, key }),
        _ => Err(ConfigError::MissingKaggle { path }),
    }
}

/// `resolve_kaggle_from` convenience wrapper.
pub fn resolve_kaggle() -> Result<KaggleCredentials, ConfigError> {
    resolve_kaggle_from(process_env, dirs::home_dir().as_deref())
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// Resolve the GitHub token and API base.
pub fn resolve_github_from(
    env: impl Fn(&str) -> Option<String>,
) -> Result<GithubCredentials, ConfigError> {
    let token = non_empty(&env, "GITHUB_TOKEN").ok_or(ConfigError::MissingGithubToken)?;
    let api_url = non_empty(&env, "GITHUB_API_URL")
        .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
        .trim_end_matches('/')
        .to_string();
    Ok(GithubCredentials { token, api_url })
}

/// `resolve_github_from` convenience wrapper.
pub fn resolve_github() -> Result<GithubCredentials, ConfigError> {
    resolve_github_from(process_env)
}

// ---------------------------------------------------------------------------
// Tool settings
// ---------------------------------------------------------------------------

/// Program used to talk to Kaggle.
pub fn kaggle_bin_from(env: impl Fn(&str) -> Option<String>) -> String {
    non_empty(&env, "KMIRROR_KAGGLE_BIN").unwrap_or_else(|| DEFAULT_KAGGLE_BIN.to_string())
}

/// `kaggle_bin_from` convenience wrapper.
pub fn kaggle_bin() -> String {
    kaggle_bin_from(process_env)
}

/// Optional directory with a `readme.md.tera` override.
pub fn template_dir_from(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    non_empty(&env, "KMIRROR_TEMPLATE_DIR").map(PathBuf::from)
}

/// `template_dir_from` convenience wrapper.
pub fn template_dir() -> Option<PathBuf> {
    template_dir_from(process_env)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_kaggle_json(home: &Path, body: &str) {
        let dir = home.join(".kaggle");
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(KAGGLE_JSON), body).expect("write");
    }

    #[test]
    fn kaggle_env_pair_wins() {
        let home = TempDir::new().expect("home");
        write_kaggle_json(home.path(), r#"{"username":"file","key":"filekey"}"#);
        let creds = resolve_kaggle_from(
            env_of(&[("KAGGLE_USERNAME", "ada"), ("KAGGLE_KEY", "k")]),
            Some(home.path()),
        )
        .expect("resolve");
        assert_eq!(creds.username, "ada");
        assert_eq!(creds.key, "k");
    }

    #[test]
    fn kaggle_half_env_falls_back_to_file() {
        let home = TempDir::new().expect("home");
        write_kaggle_json(home.path(), r#"{"username":"file","key":"filekey"}"#);
        let creds = resolve_kaggle_from(env_of(&[("KAGGLE_USERNAME", "ada")]), Some(home.path()))
            .expect("resolve");
        assert_eq!(creds.username, "file");
        assert_eq!(creds.key, "filekey");
    }

    #[test]
    fn kaggle_config_dir_overrides_home() {
        let home = TempDir::new().expect("home");
        let cfg = TempDir::new().expect("cfg");
        std::fs::write(
            cfg.path().join(KAGGLE_JSON),
            r#"{"username":"cfg","key":"cfgkey"}"#,
        )
        .expect("write");
        let dir = cfg.path().to_string_lossy().to_string();
        let env = env_of(&[("KAGGLE_CONFIG_DIR", dir.as_str())]);
        let creds = resolve_kaggle_from(env, Some(home.path())).expect("resolve");
        assert_eq!(creds.username, "cfg");
    }

    #[test]
    fn kaggle_missing_everywhere() {
        let home = TempDir::new().expect("home");
        let err = resolve_kaggle_from(env_of(&[]), Some(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKaggle { .. }), "got: {err}");
        assert!(err.to_string().contains("kaggle.json"));
    }

    #[test]
    fn kaggle_empty_env_values_count_as_missing() {
        let home = TempDir::new().expect("home");
        let err = resolve_kaggle_from(
            env_of(&[("KAGGLE_USERNAME", ""), ("KAGGLE_KEY", "  ")]),
            Some(home.path()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingKaggle { .. }), "got: {err}");
    }

    #[test]
    fn kaggle_json_without_key_is_missing() {
        let home = TempDir::new().expect("home");
        write_kaggle_json(home.path(), r#"{"username":"file"}"#);
        let err = resolve_kaggle_from(env_of(&[]), Some(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKaggle { .. }), "got: {err}");
    }

    #[test]
    fn kaggle_malformed_json_is_parse_error() {
        let home = TempDir::new().expect("home");
        write_kaggle_json(home.path(), "{ not json");
        let err = resolve_kaggle_from(env_of(&[]), Some(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn kaggle_no_home_and_no_config_dir() {
        let err = resolve_kaggle_from(env_of(&[]), None).unwrap_err();
        assert!(matches!(err, ConfigError::HomeNotFound), "got: {err}");
    }

    #[test]
    fn github_token_required() {
        let err = resolve_github_from(env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingGithubToken));
    }

    #[test]
    fn github_api_url_default_and_override() {
        let creds = resolve_github_from(env_of(&[("GITHUB_TOKEN", "t")])).expect("resolve");
        assert_eq!(creds.api_url, DEFAULT_GITHUB_API_URL);

        let creds = resolve_github_from(env_of(&[
            ("GITHUB_TOKEN", "t"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
        ]))
        .expect("resolve");
        assert_eq!(creds.api_url, "https://ghe.example.com/api/v3");
    }

    #[test]
    fn debug_redacts_secrets() {
        let k = KaggleCredentials {
            username: "ada".into(),
            key: "supersecret".into(),
        };
        let g = GithubCredentials {
            token: "ghp_secret".into(),
            api_url: DEFAULT_GITHUB_API_URL.into(),
        };
        assert!(!format!("{k:?}").contains("supersecret"));
        assert!(!format!("{g:?}").contains("ghp_secret"));
    }

    #[test]
    fn kaggle_bin_default_and_override() {
        assert_eq!(kaggle_bin_from(env_of(&[])), "kaggle");
        assert_eq!(
            kaggle_bin_from(env_of(&[("KMIRROR_KAGGLE_BIN", "/opt/kaggle")])),
            "/opt/kaggle"
        );
    }
}
