//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::FilterSpec;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream search settings
    #[serde(default)]
    pub arxiv: ArxivConfig,

    /// Store and document locations, relative to the root directory
    #[serde(default)]
    pub paths: PathsConfig,

    /// Layout of the main document
    #[serde(default)]
    pub readme: RenderOptions,

    /// Layout of the web document
    #[serde(default = "defaults::web_render")]
    pub web: RenderOptions,

    /// Topics in rendering order
    #[serde(default)]
    pub topics: Vec<TopicConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AppError::config(e.to_string()))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.arxiv.max_results == 0 {
            return Err(AppError::config("arxiv.max_results must be > 0"));
        }
        if self.arxiv.timeout_secs == 0 {
            return Err(AppError::config("arxiv.timeout_secs must be > 0"));
        }
        if self.arxiv.max_concurrent == 0 {
            return Err(AppError::config("arxiv.max_concurrent must be > 0"));
        }
        if self.arxiv.user_agent.trim().is_empty() {
            return Err(AppError::config("arxiv.user_agent is empty"));
        }
        url::Url::parse(&self.arxiv.api_url)
            .map_err(|e| AppError::config(format!("arxiv.api_url: {e}")))?;
        url::Url::parse(&self.arxiv.base_url)
            .map_err(|e| AppError::config(format!("arxiv.base_url: {e}")))?;
        if !self.arxiv.base_url.ends_with('/') {
            return Err(AppError::config("arxiv.base_url must end with '/'"));
        }
        if self.paths.web_store_file.is_some() != self.paths.web_document_file.is_some() {
            return Err(AppError::config(
                "paths.web_store_file and paths.web_document_file must be set together",
            ));
        }
        if self.topics.is_empty() {
            return Err(AppError::config("No topics defined"));
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            if topic.name.trim().is_empty() {
                return Err(AppError::config("topic name is blank"));
            }
            if !seen.insert(topic.name.as_str()) {
                return Err(AppError::config(format!(
                    "duplicate topic '{}'",
                    topic.name
                )));
            }
        }

        self.compile_topics().map(|_| ())
    }

    /// Compile every topic's filters, keeping topic order.
    pub fn compile_topics(&self) -> Result<Vec<TopicQuery>> {
        self.topics
            .iter()
            .map(|topic| {
                let query = topic.filters.compile().map_err(|e| {
                    AppError::config(format!("topic '{}': {e}", topic.name))
                })?;
                Ok(TopicQuery {
                    topic: topic.name.clone(),
                    query,
                })
            })
            .collect()
    }
}

/// Upstream search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    /// Prefix of canonical paper links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Atom API endpoint
    #[serde(default = "defaults::api_url")]
    pub api_url: String,

    /// Results requested per topic
    #[serde(default = "defaults::max_results")]
    pub max_results: usize,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Topics fetched in flight at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            api_url: defaults::api_url(),
            max_results: defaults::max_results(),
            timeout_secs: defaults::timeout(),
            user_agent: defaults::user_agent(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// File locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::store_file")]
    pub store_file: String,

    #[serde(default = "defaults::document_file")]
    pub document_file: String,

    /// Store of web-list entries; the web document is skipped when unset
    #[serde(default)]
    pub web_store_file: Option<String>,

    #[serde(default)]
    pub web_document_file: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store_file: defaults::store_file(),
            document_file: defaults::document_file(),
            web_store_file: None,
            web_document_file: None,
        }
    }
}

/// Layout switches for a rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// `## Updated on` heading plus table headers, instead of a quote line
    #[serde(default = "defaults::enabled")]
    pub use_title: bool,

    /// Table of contents
    #[serde(default = "defaults::enabled")]
    pub use_tc: bool,

    /// "back to top" link after each topic
    #[serde(default = "defaults::enabled")]
    pub use_b2t: bool,

    /// Web table header variant; forced on for the web document
    #[serde(default)]
    pub to_web: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            use_title: true,
            use_tc: true,
            use_b2t: true,
            to_web: false,
        }
    }
}

/// One topic and its filter tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub name: String,
    pub filters: FilterSpec,
}

/// A topic with its compiled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
    pub topic: String,
    pub query: String,
}

mod defaults {
    use super::RenderOptions;

    pub fn base_url() -> String {
        "http://arxiv.org/".into()
    }
    pub fn api_url() -> String {
        "https://export.arxiv.org/api/query".into()
    }
    pub fn max_results() -> usize {
        10
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn user_agent() -> String {
        concat!("arxiv-digest/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn max_concurrent() -> usize {
        1
    }

    pub fn store_file() -> String {
        "docs/arxiv-daily.json".into()
    }
    pub fn document_file() -> String {
        "README.md".into()
    }

    pub fn enabled() -> bool {
        true
    }
    pub fn web_render() -> RenderOptions {
        RenderOptions {
            use_title: true,
            use_tc: false,
            use_b2t: false,
            to_web: true,
        }
    }
}
