//! Per-file load report, for authors checking why a post is missing

use super::{duplicate_slugs, ContentStore};
use crate::content::{ContentError, Post};

/// What happened to one source file
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { slug: String },
    Unpublished { slug: String },
    Rejected(ContentError),
}

#[derive(Debug)]
pub struct LoadEntry {
    pub source: String,
    pub outcome: LoadOutcome,
}

/// Result of a diagnostic pass over the content source
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Set when the source itself could not be read
    pub source_error: Option<ContentError>,
    pub entries: Vec<LoadEntry>,
    pub duplicate_slugs: Vec<String>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.count(|o| matches!(o, LoadOutcome::Loaded { .. }))
    }

    pub fn unpublished(&self) -> usize {
        self.count(|o| matches!(o, LoadOutcome::Unpublished { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, LoadOutcome::Rejected(_)))
    }

    /// True when every file parsed and the source was readable
    pub fn is_clean(&self) -> bool {
        self.source_error.is_none() && self.rejected() == 0
    }

    fn count(&self, predicate: impl Fn(&LoadOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

impl ContentStore {
    /// Parse every file again and report the outcome of each
    ///
    /// Leaves the memoized collection untouched.
    pub fn diagnose(&self) -> LoadReport {
        let parsed = match self.parse_source() {
            Ok(parsed) => parsed,
            Err(e) => {
                return LoadReport {
                    source_error: Some(e),
                    ..LoadReport::default()
                }
            }
        };

        let mut published: Vec<Post> = Vec::new();
        let entries: Vec<LoadEntry> = parsed
            .into_iter()
            .map(|(source, result)| {
                let outcome = match result {
                    Ok(post) if post.published => {
                        let slug = post.slug.clone();
                        published.push(post);
                        LoadOutcome::Loaded { slug }
                    }
                    Ok(post) => LoadOutcome::Unpublished { slug: post.slug },
                    Err(e) => LoadOutcome::Rejected(e),
                };
                LoadEntry { source, outcome }
            })
            .collect();

        LoadReport {
            source_error: None,
            entries,
            duplicate_slugs: duplicate_slugs(&published),
        }
    }
}
