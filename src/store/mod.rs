//! Content store - loads posts once, memoizes them and answers queries
//!
//! The store reads every raw file from its [`ContentSource`] on the first
//! query, parses and filters them into the published collection, and keeps
//! that snapshot until [`ContentStore::invalidate_cache`] is called. No
//! operation returns an error: broken files are logged and skipped, and a
//! failing source yields an empty collection.

mod report;
mod series;

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use crate::content::{ContentError, ContentSource, ParseOptions, Post};

pub use report::{LoadEntry, LoadOutcome, LoadReport};
pub use series::{SeriesInfo, SeriesNavigation};

/// Memoized, queryable collection of published posts
pub struct ContentStore {
    source: Arc<dyn ContentSource>,
    options: ParseOptions,
    series_descriptions: HashMap<String, String>,
    cache: RwLock<Option<Arc<Vec<Post>>>>,
    /// Bumped by every invalidation, under the cache write lock
    generation: AtomicU64,
    loads: AtomicUsize,
}

impl ContentStore {
    /// Create a store over a content source with default parse options
    pub fn new(source: impl ContentSource + 'static) -> Self {
        Self::with_options(Arc::new(source), ParseOptions::default())
    }

    /// Create a store with explicit parse options
    pub fn with_options(source: Arc<dyn ContentSource>, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            series_descriptions: HashMap::new(),
            cache: RwLock::new(None),
            generation: AtomicU64::new(0),
            loads: AtomicUsize::new(0),
        }
    }

    /// Set the hand-written descriptions shown for series
    pub fn with_series_descriptions(mut self, descriptions: HashMap<String, String>) -> Self {
        self.series_descriptions = descriptions;
        self
    }

    /// All published posts, newest first
    ///
    /// The first call reads and parses every file; later calls return the
    /// same snapshot until the cache is invalidated.
    pub fn load_all(&self) -> Arc<Vec<Post>> {
        if let Some(posts) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(posts);
        }

        // Built outside the lock: concurrent first callers may each build.
        // A build that raced an invalidation is returned but not cached.
        let generation = self.generation.load(Ordering::Acquire);
        let posts = Arc::new(self.build());

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) == generation {
            *cache = Some(Arc::clone(&posts));
        } else {
            tracing::debug!("Cache invalidated during load; not caching the result");
        }
        posts
    }

    /// Drop the memoized collection so the next query reloads
    pub fn invalidate_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        if cache.take().is_some() {
            tracing::debug!("Content cache invalidated");
        }
    }

    /// How many times the collection has been built
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// Find a post by slug
    pub fn get_by_slug(&self, slug: &str) -> Option<Post> {
        self.load_all().iter().find(|p| p.slug == slug).cloned()
    }

    /// Posts in a category (exact, case-sensitive match)
    pub fn get_by_category(&self, category: &str) -> Vec<Post> {
        self.filter(|p| p.category == category)
    }

    /// Posts carrying a tag
    pub fn get_by_tag(&self, tag: &str) -> Vec<Post> {
        self.filter(|p| p.tags.iter().any(|t| t == tag))
    }

    /// Distinct categories, sorted
    pub fn list_categories(&self) -> Vec<String> {
        let posts = self.load_all();
        let categories: BTreeSet<&str> = posts.iter().map(|p| p.category.as_str()).collect();
        categories.into_iter().map(String::from).collect()
    }

    /// Distinct tags, sorted
    pub fn list_tags(&self) -> Vec<String> {
        let posts = self.load_all();
        let tags: BTreeSet<&str> = posts
            .iter()
            .flat_map(|p| p.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(String::from).collect()
    }

    fn filter<F>(&self, predicate: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        self.load_all()
            .iter()
            .filter(|p| predicate(p))
            .cloned()
            .collect()
    }

    /// Read every file and parse it, keeping per-file results in source order
    fn parse_source(&self) -> Result<Vec<(String, Result<Post, ContentError>)>, ContentError> {
        let files = self.source.fetch_all()?;
        Ok(files
            .iter()
            .map(|(path, raw)| (path.clone(), Post::parse(path, raw, &self.options)))
            .collect())
    }

    fn build(&self) -> Vec<Post> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let parsed = match self.parse_source() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to read content source: {}", e);
                return Vec::new();
            }
        };
        if parsed.is_empty() {
            tracing::warn!("Content source returned no files");
            return Vec::new();
        }

        let total = parsed.len();
        let mut posts = Vec::with_capacity(total);
        for (path, result) in parsed {
            match result {
                Ok(post) if post.published => posts.push(post),
                Ok(post) => tracing::debug!("Skipping unpublished post {}", post.source),
                Err(e) => tracing::warn!("Failed to load post {}: {}", path, e),
            }
        }

        // Stable, so equal dates keep source order
        posts.sort_by(|a, b| b.published_date.cmp(&a.published_date));

        for slug in duplicate_slugs(&posts) {
            tracing::warn!("Duplicate slug {:?}; lookups return the newest post", slug);
        }

        tracing::debug!(
            "Loaded {} of {} posts in {:?}",
            posts.len(),
            total,
            start.elapsed()
        );
        posts
    }
}

/// Slugs used by more than one post, sorted
pub(crate) fn duplicate_slugs(posts: &[Post]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for post in posts {
        if !seen.insert(post.slug.as_str()) {
            duplicates.insert(post.slug.clone());
        }
    }
    duplicates.into_iter().collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::{MemorySource, RawContent};
    use std::sync::{OnceLock, Weak};

    /// Raw text of a post with the given front-matter fields
    pub(crate) fn post(fields: &str, body: &str) -> String {
        format!("---\n{}\n---\n{}", fields, body)
    }

    pub(crate) fn dated(title: &str, date: &str) -> String {
        post(
            &format!("title: \"{}\"\nexcerpt: About {}\npublishedDate: \"{}\"", title, title, date),
            "Some body text.",
        )
    }

    struct FailingSource;

    impl ContentSource for FailingSource {
        fn fetch_all(&self) -> Result<RawContent, ContentError> {
            Err(ContentError::SourceUnavailable("content/blog".into()))
        }
    }

    fn sample_store() -> ContentStore {
        ContentStore::new(
            MemorySource::new()
                .with_file(
                    "rust-tips.md",
                    post(
                        "title: Rust Tips\nexcerpt: E\npublishedDate: 2025-01-05\n\
                         tags: [rust, tips]\ncategory: engineering",
                        "",
                    ),
                )
                .with_file(
                    "career.md",
                    post(
                        "title: Career\nexcerpt: E\npublishedDate: 2025-02-01\n\
                         tags: [life]\ncategory: Personal",
                        "",
                    ),
                )
                .with_file(
                    "async.md",
                    post(
                        "title: Async\nexcerpt: E\npublishedDate: 2025-03-01\n\
                         tags: [rust, async]",
                        "",
                    ),
                )
                .with_file(
                    "draft.md",
                    post(
                        "title: Draft\nexcerpt: E\npublishedDate: 2025-04-01\n\
                         tags: [secret]\ncategory: hidden\npublished: false",
                        "",
                    ),
                ),
        )
    }

    #[test]
    fn test_load_all_sorted_newest_first() {
        let store = sample_store();
        let posts = store.load_all();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["async", "career", "rust-tips"]);

        for pair in posts.windows(2) {
            assert!(pair[0].published_date >= pair[1].published_date);
        }
        assert!(posts.iter().all(|p| p.published));
        assert!(posts.iter().all(|p| p.read_time >= 1));
    }

    #[test]
    fn test_equal_dates_keep_source_order() {
        let store = ContentStore::new(
            MemorySource::new()
                .with_file("b.md", dated("B", "2025-01-01"))
                .with_file("a.md", dated("A", "2025-01-01"))
                .with_file("c.md", dated("C", "2025-01-02")),
        );
        let slugs: Vec<_> = store.load_all().iter().map(|p| p.slug.clone()).collect();
        assert_eq!(slugs, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_load_all_is_memoized() {
        let store = sample_store();
        let first = store.load_all();
        let second = store.load_all();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.load_count(), 1);

        store.get_by_tag("rust");
        store.list_categories();
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_invalidate_cache_forces_reload() {
        let store = sample_store();
        let first = store.load_all();
        store.invalidate_cache();
        let second = store.load_all();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(store.load_count(), 2);
    }

    /// Invalidates its store in the middle of the first fetch
    struct InvalidatingSource {
        store: OnceLock<Weak<ContentStore>>,
        fetches: AtomicUsize,
    }

    impl ContentSource for InvalidatingSource {
        fn fetch_all(&self) -> Result<RawContent, ContentError> {
            let title = if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
                if let Some(store) = self.store.get().and_then(Weak::upgrade) {
                    store.invalidate_cache();
                }
                "Old"
            } else {
                "New"
            };
            Ok(MemorySource::new()
                .with_file("post.md", dated(title, "2025-01-01"))
                .fetch_all()?)
        }
    }

    #[test]
    fn test_invalidation_during_load_is_not_lost() {
        let source = Arc::new(InvalidatingSource {
            store: OnceLock::new(),
            fetches: AtomicUsize::new(0),
        });
        let store = Arc::new(ContentStore::with_options(
            Arc::clone(&source) as Arc<dyn ContentSource>,
            ParseOptions::default(),
        ));
        source.store.set(Arc::downgrade(&store)).unwrap();

        // The stale build is still returned to its caller
        assert_eq!(store.load_all()[0].title, "Old");

        let fresh = store.load_all();
        assert_eq!(fresh[0].title, "New");
        assert_eq!(store.load_count(), 2);

        assert!(Arc::ptr_eq(&fresh, &store.load_all()));
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn test_bare_values_load() {
        let store = ContentStore::new(
            MemorySource::new()
                .with_file(
                    "good-parts.md",
                    post(
                        "title: Rust: the good parts\nexcerpt: @rustlang shares news\n\
                         publishedDate: 2025-01-01\ntags: [rust, \"web, dev\"]",
                        "",
                    ),
                )
                .with_file(
                    "first.md",
                    post("title: Post #1\nexcerpt: *Starred*\npublishedDate: 2025-01-02", ""),
                ),
        );

        let posts = store.load_all();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Post #1");
        assert_eq!(posts[0].excerpt, "*Starred*");
        assert_eq!(posts[1].title, "Rust: the good parts");
        assert_eq!(store.get_by_tag("web, dev")[0].slug, "good-parts");
    }

    #[test]
    fn test_queries() {
        let store = sample_store();

        assert_eq!(store.get_by_slug("career").unwrap().title, "Career");
        assert!(store.get_by_slug("missing").is_none());

        let engineering = store.get_by_category("engineering");
        assert_eq!(engineering.len(), 1);
        assert_eq!(engineering[0].slug, "rust-tips");
        assert!(store.get_by_category("personal").is_empty());
        assert_eq!(store.get_by_category("general")[0].slug, "async");

        let rust: Vec<_> = store.get_by_tag("rust").into_iter().map(|p| p.slug).collect();
        assert_eq!(rust, vec!["async", "rust-tips"]);
        assert!(store.get_by_tag("Rust").is_empty());

        assert_eq!(
            store.list_categories(),
            vec!["Personal", "engineering", "general"]
        );
        assert_eq!(store.list_tags(), vec!["async", "life", "rust", "tips"]);
    }

    #[test]
    fn test_unpublished_never_returned() {
        let store = sample_store();
        assert!(store.get_by_slug("draft").is_none());
        assert!(store.get_by_tag("secret").is_empty());
        assert!(store.get_by_category("hidden").is_empty());
        assert!(!store.list_tags().contains(&"secret".to_string()));
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let store = ContentStore::new(
            MemorySource::new()
                .with_file("good.md", dated("Good", "2025-01-01"))
                .with_file("no-block.md", "# Just markdown\n\nNo metadata.")
                .with_file("no-title.md", post("excerpt: E\npublishedDate: 2025-01-01", ""))
                .with_file(
                    "stray-line.md",
                    post("title: A\nexcerpt: E\npublishedDate: 2025-01-01\njust prose", ""),
                ),
        );
        let posts = store.load_all();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");
    }

    #[test]
    fn test_failing_source_yields_empty() {
        let store = ContentStore::new(FailingSource);
        assert!(store.load_all().is_empty());
        assert!(store.get_by_slug("anything").is_none());
        assert!(store.list_tags().is_empty());
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_empty_source_yields_empty() {
        let store = ContentStore::new(MemorySource::from(RawContent::new()));
        assert!(store.load_all().is_empty());
        assert!(store.list_categories().is_empty());
    }

    #[test]
    fn test_published_and_draft_scenario() {
        let store = ContentStore::new(
            MemorySource::new()
                .with_file(
                    "first.md",
                    post(
                        "title: \"First\"\nexcerpt: One\npublishedDate: \"2025-01-10\"\npublished: true",
                        "",
                    ),
                )
                .with_file(
                    "second.md",
                    post(
                        "title: \"Second\"\nexcerpt: Two\npublishedDate: \"2025-01-15\"\npublished: false",
                        "",
                    ),
                ),
        );

        let posts = store.load_all();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "First");
        assert!(store.get_by_slug("second").is_none());
    }

    #[test]
    fn test_duplicate_slugs() {
        let store = ContentStore::new(
            MemorySource::new()
                .with_file("2024/hello.md", dated("Old hello", "2024-01-01"))
                .with_file("2025/hello.md", dated("New hello", "2025-01-01")),
        );
        assert_eq!(store.load_all().len(), 2);
        assert_eq!(store.get_by_slug("hello").unwrap().title, "New hello");
        assert_eq!(duplicate_slugs(&store.load_all()), vec!["hello"]);
    }
}
