//! Content sources - bulk retrieval of raw post text

use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ContentError;

/// Raw file contents keyed by source path
pub type RawContent = IndexMap<String, String>;

/// Supplies the raw text of every post, all at once
pub trait ContentSource: Send + Sync {
    /// Return a mapping from source path to full raw text
    fn fetch_all(&self) -> Result<RawContent, ContentError>;
}

/// Reads posts from a directory tree
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    include: Vec<Pattern>,
}

impl DirectorySource {
    /// Default include patterns
    pub const DEFAULT_INCLUDE: [&'static str; 3] = ["**/*.md", "**/*.mdx", "**/*.markdown"];

    /// Create a source over `root` matching the given glob patterns
    pub fn new<P: AsRef<Path>, S: AsRef<str>>(root: P, include: &[S]) -> Result<Self, ContentError> {
        let include = include
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.as_ref().to_path_buf(),
            include,
        })
    }

    /// The directory being read
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_included(&self, relative: &str) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        self.include
            .iter()
            .any(|p| p.matches_with(relative, options))
    }
}

impl ContentSource for DirectorySource {
    fn fetch_all(&self) -> Result<RawContent, ContentError> {
        if !self.root.is_dir() {
            return Err(ContentError::SourceUnavailable(self.root.clone()));
        }

        let mut files = RawContent::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if !self.is_included(&relative) {
                continue;
            }

            match fs::read_to_string(path) {
                Ok(content) => {
                    files.insert(relative, content);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {:?}: {}", path, e);
                }
            }
        }

        tracing::debug!("Read {} files from {:?}", files.len(), self.root);
        Ok(files)
    }
}

/// A fixed set of files held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: RawContent,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing any previous one with the same path
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl From<RawContent> for MemorySource {
    fn from(files: RawContent) -> Self {
        Self { files }
    }
}

impl ContentSource for MemorySource {
    fn fetch_all(&self) -> Result<RawContent, ContentError> {
        Ok(self.files.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_source_filters_and_keys() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2025/rust")).unwrap();
        fs::write(root.join("a.md"), "alpha").unwrap();
        fs::write(root.join("2025/rust/b.mdx"), "beta").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join(".hidden.md"), "ignored").unwrap();

        let source = DirectorySource::new(root, &DirectorySource::DEFAULT_INCLUDE).unwrap();
        let files = source.fetch_all().unwrap();

        let keys: Vec<_> = files.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2025/rust/b.mdx", "a.md"]);
        assert_eq!(files["a.md"], "alpha");
        assert_eq!(files["2025/rust/b.mdx"], "beta");
    }

    #[test]
    fn test_directory_source_custom_patterns() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("post.md"), "kept").unwrap();
        fs::write(dir.path().join("drafts/wip.md"), "skipped").unwrap();

        let source = DirectorySource::new(dir.path(), &["*.md"]).unwrap();
        let files = source.fetch_all().unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("post.md"));
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let source =
            DirectorySource::new(dir.path().join("nope"), &DirectorySource::DEFAULT_INCLUDE)
                .unwrap();
        assert!(matches!(
            source.fetch_all(),
            Err(ContentError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = DirectorySource::new("content", &["[unclosed"]).unwrap_err();
        assert!(matches!(err, ContentError::Pattern(_)));
    }

    #[test]
    fn test_memory_source_keeps_insertion_order() {
        let source = MemorySource::new()
            .with_file("z.md", "last name, first in")
            .with_file("a.md", "second");
        let files = source.fetch_all().unwrap();
        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(keys, vec!["z.md", "a.md"]);
    }
}
