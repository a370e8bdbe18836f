use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the content API lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token sent on every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment
    pub fn from_env() -> ClientResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from `PAGECRAFT_API_URL`, `PAGECRAFT_API_TOKEN` and
    /// `PAGECRAFT_API_TIMEOUT_SECS` as returned by `get`
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let mut config = ClientConfig::default();
        if let Some(url) = get("PAGECRAFT_API_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config.token = get("PAGECRAFT_API_TOKEN").filter(|v| !v.trim().is_empty());
        if let Some(raw) = get("PAGECRAFT_API_TIMEOUT_SECS") {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("PAGECRAFT_API_TIMEOUT_SECS must be a whole number, got '{}'", raw))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> ClientResult<Self> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn validate(&self) -> ClientResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}
