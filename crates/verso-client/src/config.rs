//! Client configuration from environment variables.

use std::env;

use crate::session::DEFAULT_PAGE_SIZE;

/// Repository id used when none is configured.
pub const DEFAULT_REPOSITORY_ID: &str = "default";

/// Configuration for a repository session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Repository every remote call is addressed to.
    pub repository_id: String,
    /// Page size hint for server-side listings requested without a window.
    pub default_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            repository_id: DEFAULT_REPOSITORY_ID.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `VERSO_REPOSITORY_ID` - Optional, defaults to "default"
    /// - `VERSO_PAGE_SIZE` - Optional, defaults to 100; must be a positive integer
    pub fn from_env() -> Result<Self, ConfigError> {
        let repository_id = env::var("VERSO_REPOSITORY_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REPOSITORY_ID.to_string());

        let default_page_size = match env::var("VERSO_PAGE_SIZE") {
            Ok(raw) => parse_page_size(&raw)?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            repository_id,
            default_page_size,
        })
    }

    pub fn with_repository_id(mut self, repository_id: impl Into<String>) -> Self {
        self.repository_id = repository_id.into();
        self
    }
}

fn parse_page_size(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            name: "VERSO_PAGE_SIZE".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue {
            name: "VERSO_PAGE_SIZE".to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
