//! Application configuration for lessonmap.
//!
//! User config lives at `~/.lessonmap/lessonmap.toml`.
//! Environment variables override config file values, which override defaults.
//!
//! The CMS base address has no default: [`CmsConfig::resolve`] is expected to
//! run once at startup and stop the process when the address is missing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LessonmapError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "lessonmap.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".lessonmap";

/// Default sidebar state file name inside the config directory.
const SIDEBAR_STATE_FILE_NAME: &str = "sidebar.json";

/// Env vars consulted for the CMS base address, in priority order.
const BASE_URL_ENV_VARS: [&str; 2] = ["STRAPI_URL", "NEXT_PUBLIC_STRAPI_URL"];

// ---------------------------------------------------------------------------
// Config structs (matching lessonmap.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// CMS connection settings.
    #[serde(default)]
    pub cms: CmsSection,

    /// Sidebar state persistence.
    #[serde(default)]
    pub sidebar: SidebarSection,
}

/// `[cms]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsSection {
    /// CMS base address, e.g. `http://localhost:1337`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Name of the env var holding the API token (never store the token itself).
    #[serde(default = "default_api_token_env")]
    pub api_token_env: String,

    /// Forced publication state. When unset, `preview` is used if a token is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_state: Option<PublicationState>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CmsSection {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token_env: default_api_token_env(),
            publication_state: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_token_env() -> String {
    "STRAPI_API_TOKEN".into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[sidebar]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidebarSection {
    /// Where expand/collapse state is persisted. Defaults to `~/.lessonmap/sidebar.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<String>,
}

/// Strapi publication state: published entries only, or drafts too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationState {
    Live,
    Preview,
}

impl PublicationState {
    /// Query-string value understood by the CMS.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Preview => "preview",
        }
    }
}

// ---------------------------------------------------------------------------
// CMS config (runtime, merged from config file + environment)
// ---------------------------------------------------------------------------

/// Runtime CMS configuration, validated and ready to hand to the client.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Absolute http(s) base address of the CMS.
    pub base_url: Url,
    /// Bearer token attached to every request when present.
    pub api_token: Option<String>,
    /// Publication state sent with every collection query.
    pub publication_state: PublicationState,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl CmsConfig {
    /// Config for an explicit base address with no token (published content only).
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            publication_state: PublicationState::Live,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Attach a bearer token and switch to draft visibility.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self.publication_state = PublicationState::Preview;
        self
    }

    /// Merge the config file with the process environment.
    ///
    /// Fails when no base address is configured anywhere, or when the one
    /// found is not an absolute http(s) URL.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Like [`CmsConfig::resolve`], reading variables through `env`.
    pub fn resolve_with(config: &AppConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let from_env = BASE_URL_ENV_VARS
            .iter()
            .find_map(|&name| env(name).filter(|v| !v.trim().is_empty()));

        let raw = from_env
            .or_else(|| config.cms.base_url.clone().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                LessonmapError::config(
                    "CMS base address missing. Set STRAPI_URL (or [cms].base_url in lessonmap.toml).",
                )
            })?;

        let base_url = parse_base_url(&raw)?;

        let api_token = env(config.cms.api_token_env.as_str()).filter(|v| !v.trim().is_empty());

        let publication_state = config.cms.publication_state.unwrap_or(if api_token.is_some() {
            PublicationState::Preview
        } else {
            PublicationState::Live
        });

        Ok(Self {
            base_url,
            api_token,
            publication_state,
            timeout_secs: config.cms.timeout_secs,
        })
    }

    /// Base address as a string without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| LessonmapError::config(format!("invalid CMS base address '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(LessonmapError::config(format!(
            "CMS base address must be an absolute http(s) URL, got '{raw}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.lessonmap/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LessonmapError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.lessonmap/lessonmap.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Where sidebar expand/collapse state is persisted.
pub fn sidebar_state_path(config: &AppConfig) -> Result<PathBuf> {
    match &config.sidebar.state_file {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(config_dir()?.join(SIDEBAR_STATE_FILE_NAME)),
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LessonmapError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LessonmapError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LessonmapError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig {
        cms: CmsSection {
            base_url: Some("http://localhost:1337".into()),
            ..CmsSection::default()
        },
        ..AppConfig::default()
    };
    let content =
        toml::to_string_pretty(&config).map_err(|e| LessonmapError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LessonmapError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("STRAPI_API_TOKEN"));
        assert!(!toml_str.contains("base_url"));
    }

    #[test]
    fn config_with_cms_section() {
        let toml_str = r#"
[cms]
base_url = "https://cms.example.edu"
publication_state = "preview"
timeout_secs = 3

[sidebar]
state_file = "/tmp/sidebar.json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.cms.base_url.as_deref(), Some("https://cms.example.edu"));
        assert_eq!(config.cms.publication_state, Some(PublicationState::Preview));
        assert_eq!(config.cms.api_token_env, "STRAPI_API_TOKEN");
        assert_eq!(
            sidebar_state_path(&config).unwrap(),
            PathBuf::from("/tmp/sidebar.json")
        );
    }

    #[test]
    fn missing_base_url_is_fatal() {
        let result = CmsConfig::resolve_with(&AppConfig::default(), env_from(&[]));
        let err = result.unwrap_err();
        assert!(matches!(err, LessonmapError::Config { .. }));
        assert!(err.to_string().contains("STRAPI_URL"));
    }

    #[test]
    fn blank_env_value_counts_as_missing() {
        let result = CmsConfig::resolve_with(&AppConfig::default(), env_from(&[("STRAPI_URL", "  ")]));
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut config = AppConfig::default();
        config.cms.base_url = Some("http://file.example".into());

        let cms = CmsConfig::resolve_with(
            &config,
            env_from(&[
                ("NEXT_PUBLIC_STRAPI_URL", "http://public.example"),
                ("STRAPI_URL", "http://server.example/"),
            ]),
        )
        .unwrap();
        assert_eq!(cms.base(), "http://server.example");

        let cms = CmsConfig::resolve_with(&config, env_from(&[])).unwrap();
        assert_eq!(cms.base(), "http://file.example");
    }

    #[test]
    fn rejects_non_http_base() {
        for raw in ["localhost:1337", "ftp://cms.example", "not a url"] {
            let result = CmsConfig::resolve_with(&AppConfig::default(), env_from(&[("STRAPI_URL", raw)]));
            assert!(result.is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn token_switches_to_preview() {
        let env = env_from(&[("STRAPI_URL", "http://cms.test"), ("STRAPI_API_TOKEN", "s3cret")]);
        let cms = CmsConfig::resolve_with(&AppConfig::default(), env).unwrap();
        assert_eq!(cms.api_token.as_deref(), Some("s3cret"));
        assert_eq!(cms.publication_state, PublicationState::Preview);

        let cms = CmsConfig::resolve_with(&AppConfig::default(), env_from(&[("STRAPI_URL", "http://cms.test")]))
            .unwrap();
        assert!(cms.api_token.is_none());
        assert_eq!(cms.publication_state, PublicationState::Live);
    }

    #[test]
    fn forced_publication_state_wins() {
        let mut config = AppConfig::default();
        config.cms.publication_state = Some(PublicationState::Live);
        let env = env_from(&[("STRAPI_URL", "http://cms.test"), ("STRAPI_API_TOKEN", "t")]);
        let cms = CmsConfig::resolve_with(&config, env).unwrap();
        assert_eq!(cms.publication_state, PublicationState::Live);
    }
}
