//! folio: content store for a personal portfolio blog
//!
//! Posts are Markdown/MDX files with a `---` delimited front-matter block.
//! [`store::ContentStore`] loads them once, keeps the published ones in
//! memory and answers lookups by slug, category, tag and series. The
//! binary wraps the store in a few CLI commands and a JSON API server.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;
pub mod store;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use content::DirectorySource;
use store::ContentStore;

/// A site rooted at a base directory
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding the posts
    pub content_dir: std::path::PathBuf,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
        })
    }

    /// Build a content store reading from the content directory
    pub fn store(&self) -> Result<ContentStore> {
        let source = DirectorySource::new(&self.content_dir, &self.config.include)?;
        Ok(
            ContentStore::with_options(Arc::new(source), self.config.parse_options())
                .with_series_descriptions(self.config.series.clone()),
        )
    }
}
