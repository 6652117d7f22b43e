//! Client configuration.
//!
//! Configuration can come from defaults, a YAML file or a YAML string, and
//! the API key and base URL can be overridden from the environment:
//!
//! ```yaml
//! api_key: 0123456789abcdef
//! base_url: https://api.spoonacular.com/recipes
//! page_size: 10
//! ```

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Default endpoint of the recipe API.
pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com/recipes";

/// Number of results requested per search page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const API_KEY_ENV: &str = "RECIPE_FINDER_API_KEY";
pub const BASE_URL_ENV: &str = "RECIPE_FINDER_BASE_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("No API key configured")]
    MissingApiKey,
}

/// Settings for [`crate::RecipeClient`] and [`crate::SearchSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the default endpoint and the given key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        ClientConfig {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Parses a configuration from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_yaml::from_str(yaml)?;
        Ok(config.normalized())
    }

    /// Reads and parses a YAML configuration file.
    pub fn from_yaml_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Applies `RECIPE_FINDER_API_KEY` and `RECIPE_FINDER_BASE_URL` overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(BASE_URL_ENV).ok(),
        )
    }

    fn with_overrides(mut self, api_key: Option<String>, base_url: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = key;
        }
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        self.normalized()
    }

    /// Checks that the configuration can be used to talk to the API.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.page_size = self.page_size.max(1);
        self
    }
}
