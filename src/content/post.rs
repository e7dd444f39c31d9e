//! Post model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::frontmatter::parse_date_string;
use super::{ContentError, FrontMatter};

/// Category given to posts that do not name one
pub const DEFAULT_CATEGORY: &str = "general";

/// Reading speed used for `read_time`
pub const WORDS_PER_MINUTE: usize = 200;

/// Settings applied while turning raw text into posts
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub default_category: String,
    pub words_per_minute: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            words_per_minute: WORDS_PER_MINUTE,
        }
    }
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// URL-friendly identifier, unique across the collection
    pub slug: String,

    /// Post title
    pub title: String,

    /// Short summary shown in listings
    pub excerpt: String,

    /// Publication date
    pub published_date: NaiveDateTime,

    /// Last updated date
    pub updated_date: Option<NaiveDateTime>,

    /// Post tags
    pub tags: Vec<String>,

    /// Post category
    pub category: String,

    /// Cover image path or URL
    pub featured_image: Option<String>,

    /// Whether the post is published
    pub published: bool,

    /// Estimated reading time in minutes, never below 1
    pub read_time: u32,

    /// Series this post belongs to
    pub series: Option<String>,

    /// Position within the series
    pub series_order: i64,

    /// Body text after the front-matter block
    pub content: String,

    /// Source path the post was loaded from
    pub source: String,
}

impl Post {
    /// Parse a post from its source path and raw file contents
    pub fn parse(source: &str, raw: &str, options: &ParseOptions) -> Result<Self, ContentError> {
        let (fm, body) = FrontMatter::parse(raw)?;

        let title = required(fm.title, "title")?;
        let excerpt = required(fm.excerpt, "excerpt")?;
        let published_date_raw = required(fm.published_date, "publishedDate")?;
        let published_date =
            parse_date_string(&published_date_raw).ok_or(ContentError::InvalidDate {
                field: "publishedDate",
                value: published_date_raw,
            })?;

        let updated_date = fm.updated_date.as_deref().and_then(|value| {
            let parsed = parse_date_string(value);
            if parsed.is_none() {
                tracing::warn!("Ignoring invalid updatedDate {:?} in {}", value, source);
            }
            parsed
        });

        let slug = match slug_from_source(source) {
            stem if stem.is_empty() => slug::slugify(&title),
            stem => stem,
        };

        let category = fm
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| options.default_category.clone());

        Ok(Self {
            slug,
            title,
            excerpt,
            published_date,
            updated_date,
            tags: fm.tags,
            category,
            featured_image: fm.featured_image,
            published: fm.published.unwrap_or(true),
            read_time: read_time(body, options.words_per_minute),
            series: fm.series.filter(|s| !s.trim().is_empty()),
            series_order: fm.series_order.unwrap_or(0),
            content: body.to_string(),
            source: source.to_string(),
        })
    }

    /// Rebuild the front-matter this post was parsed from
    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            title: Some(self.title.clone()),
            excerpt: Some(self.excerpt.clone()),
            published_date: Some(format_date(&self.published_date)),
            updated_date: self.updated_date.as_ref().map(format_date),
            tags: self.tags.clone(),
            category: Some(self.category.clone()),
            featured_image: self.featured_image.clone(),
            published: Some(self.published),
            series: self.series.clone(),
            series_order: self.series.as_ref().map(|_| self.series_order),
        }
    }

    /// Whether the post belongs to the named series
    pub fn in_series(&self, name: &str) -> bool {
        self.series.as_deref() == Some(name)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ContentError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ContentError::MissingField(field))
}

/// Date-only when there is no time component
fn format_date(date: &NaiveDateTime) -> String {
    if date.time() == chrono::NaiveTime::MIN {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Lowercased file stem of a source path, empty when there is none
pub fn slug_from_source(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase()
}

/// Number of whitespace-delimited words
pub fn word_count(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Minutes needed to read `body`, rounded up and at least one
pub fn read_time(body: &str, words_per_minute: usize) -> u32 {
    let minutes = word_count(body).div_ceil(words_per_minute.max(1)).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
