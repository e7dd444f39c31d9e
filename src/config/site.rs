//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::{DirectorySource, ParseOptions, DEFAULT_CATEGORY, WORDS_PER_MINUTE};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub url: String,

    // Content
    pub content_dir: String,
    pub include: Vec<String>,
    pub default_category: String,
    pub words_per_minute: usize,

    /// Descriptions shown for each series, keyed by series name
    pub series: HashMap<String, String>,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            author: "John Doe".to_string(),
            url: "http://example.com".to_string(),

            content_dir: "content/blog".to_string(),
            include: DirectorySource::DEFAULT_INCLUDE
                .iter()
                .map(|p| p.to_string())
                .collect(),
            default_category: DEFAULT_CATEGORY.to_string(),
            words_per_minute: WORDS_PER_MINUTE,

            series: HashMap::new(),

            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Options used when parsing posts
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_category: self.default_category.clone(),
            words_per_minute: self.words_per_minute,
        }
    }
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
