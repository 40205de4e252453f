//! Client configuration, read from a RON file.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_logging::{chat_info, chat_warn};
use ragchat_core::{ChatSettings, JobPolicy, JobUrls};
use ragchat_engine::DispatchSettings;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILENAME: &str = "ragchat.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Everything the page would otherwise carry in data attributes, plus transport tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub post_url: String,
    pub init_url: Option<String>,
    pub progress_url: Option<String>,
    pub recommend_url: Option<String>,
    pub csrf_token: String,
    pub session_cookie: Option<String>,
    pub poll_interval_ms: u64,
    /// Unset means poll until the server says `ready` or `error`.
    pub max_polls: Option<u32>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub log: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            post_url: "/chat/".to_string(),
            init_url: Some("/chat/rag/init/".to_string()),
            progress_url: Some("/chat/rag/progress/".to_string()),
            recommend_url: Some("/chat/rag/recommend/".to_string()),
            csrf_token: String::new(),
            session_cookie: None,
            poll_interval_ms: 500,
            max_polls: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_response_bytes: 1024 * 1024,
            log: LogDestination::File,
        }
    }
}

impl ClientConfig {
    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            post_url: self.post_url.clone(),
            job_defaults: JobUrls {
                init_url: self.init_url.clone(),
                progress_url: self.progress_url.clone(),
                recommend_url: self.recommend_url.clone(),
            },
            policy: JobPolicy {
                poll_interval: Duration::from_millis(self.poll_interval_ms),
                max_polls: self.max_polls,
            },
        }
    }

    pub fn dispatch_settings(&self) -> Result<DispatchSettings, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        if self.csrf_token.is_empty() {
            chat_warn!("No CSRF token configured; POST requests will likely be rejected");
        }
        Ok(DispatchSettings {
            session_cookie: self.session_cookie.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
            ..DispatchSettings::new(base_url, self.csrf_token.clone())
        })
    }
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            chat_info!("No config at {:?}; using defaults", path);
            return Ok(ClientConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    chat_info!("Loaded config from {:?}", path);
    Ok(config)
}
