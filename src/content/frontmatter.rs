//! Front-matter parsing
//!
//! The block is a flat list of `key: value` lines. A value is bare text,
//! a single- or double-quoted string, or a bracketed list such as
//! `[rust, "web, dev"]`. Lines whose first non-blank character is `#` are
//! comments; a `#` later in a line is part of the value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

use super::ContentError;

lazy_static! {
    /// A `---` line, the metadata lines, and a closing `---` line
    static ref FRONT_MATTER_BLOCK: Regex =
        Regex::new(r"\A---[ \t]*\r?\n(?s:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap();

    /// `key: value`, split at the first colon
    static ref KEY_VALUE: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*)[ \t]*:(.*)$").unwrap();

    /// `[a, b, c]`
    static ref INLINE_LIST: Regex = Regex::new(r"^\[(.*)\]$").unwrap();

    /// `- item`, continuing a key with an empty value
    static ref LIST_ITEM: Regex = Regex::new(r"^-(?:[ \t]+(.*))?$").unwrap();
}

/// A raw value before it is assigned to a field
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Scalar(String),
    List(Vec<String>),
}

impl RawValue {
    fn parse(value: &str) -> Self {
        let value = value.trim();
        match INLINE_LIST.captures(value) {
            Some(caps) => RawValue::List(split_list(caps.get(1).map_or("", |m| m.as_str()))),
            None => RawValue::Scalar(strip_quotes(value).to_string()),
        }
    }

    /// Empty scalars read as absent
    fn into_string(self) -> Option<String> {
        match self {
            RawValue::Scalar(s) if s.is_empty() => None,
            RawValue::Scalar(s) => Some(s),
            RawValue::List(items) => Some(items.join(", ")),
        }
    }

    /// A single scalar becomes a one-item list
    fn into_list(self) -> Vec<String> {
        match self {
            RawValue::Scalar(s) if s.is_empty() => Vec::new(),
            RawValue::Scalar(s) => vec![s],
            RawValue::List(items) => items,
        }
    }
}

/// Remove one layer of matching quotes
fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Split the inside of `[...]` on commas, honoring quoted items
fn split_list(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut rest = inner.trim();

    while !rest.is_empty() {
        let quoted = rest
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .and_then(|delim| {
                // Closing quote must be followed by a comma or the end
                rest.char_indices().skip(1).find_map(|(i, c)| {
                    let after = rest[i + c.len_utf8()..].trim_start();
                    (c == delim && (after.is_empty() || after.starts_with(',')))
                        .then(|| (rest[1..i].to_string(), after))
                })
            });

        let (item, after) = match quoted {
            Some((item, after)) => (item, after),
            None => match rest.find(',') {
                Some(pos) => (rest[..pos].trim().to_string(), &rest[pos..]),
                None => (rest.trim().to_string(), ""),
            },
        };

        if !item.is_empty() {
            items.push(item);
        }
        rest = after.strip_prefix(',').unwrap_or(after).trim_start();
    }

    items
}

/// Quote a scalar so it reads back unchanged
fn quote(value: &str) -> String {
    if value.contains('"') && !value.contains('\'') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub published_date: Option<String>,
    pub updated_date: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    /// Posts are published unless this says otherwise
    pub published: Option<bool>,
    pub series: Option<String>,
    pub series_order: Option<i64>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let caps = FRONT_MATTER_BLOCK
            .captures(content)
            .ok_or(ContentError::MissingFrontMatter)?;
        let block_end = caps.get(0).map_or(0, |m| m.end());
        let block = caps.get(1).map_or("", |m| m.as_str());
        let remaining = &content[block_end..];

        Ok((Self::parse_block(block)?, remaining))
    }

    /// Parse the lines between the delimiters
    fn parse_block(block: &str) -> Result<Self, ContentError> {
        let mut fm = FrontMatter::default();
        // Key whose value was empty, collecting `- item` lines
        let mut pending: Option<(&str, usize, Vec<String>)> = None;

        for (index, line) in block.lines().enumerate() {
            // Line 1 is the opening delimiter
            let line_no = index + 2;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some((_, _, items)) = pending.as_mut() {
                if let Some(caps) = LIST_ITEM.captures(trimmed) {
                    let item = strip_quotes(caps.get(1).map_or("", |m| m.as_str().trim()));
                    if !item.is_empty() {
                        items.push(item.to_string());
                    }
                    continue;
                }
            }
            if let Some((key, key_line, items)) = pending.take() {
                let value = if items.is_empty() {
                    RawValue::Scalar(String::new())
                } else {
                    RawValue::List(items)
                };
                fm.assign(key, value, key_line)?;
            }

            let caps = KEY_VALUE
                .captures(trimmed)
                .ok_or_else(|| ContentError::InvalidFrontMatter {
                    line: line_no,
                    message: format!("expected `key: value`, found {:?}", trimmed),
                })?;
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map_or("", |m| m.as_str()).trim();

            if value.is_empty() {
                pending = Some((key, line_no, Vec::new()));
            } else {
                fm.assign(key, RawValue::parse(value), line_no)?;
            }
        }

        if let Some((key, key_line, items)) = pending {
            let value = if items.is_empty() {
                RawValue::Scalar(String::new())
            } else {
                RawValue::List(items)
            };
            fm.assign(key, value, key_line)?;
        }

        Ok(fm)
    }

    /// Store a value under its field; unknown keys are ignored
    fn assign(&mut self, key: &str, value: RawValue, line: usize) -> Result<(), ContentError> {
        match key {
            "title" => self.title = value.into_string(),
            "excerpt" => self.excerpt = value.into_string(),
            "publishedDate" => self.published_date = value.into_string(),
            "updatedDate" => self.updated_date = value.into_string(),
            "tags" => self.tags = value.into_list(),
            "category" => self.category = value.into_string(),
            "featuredImage" => self.featured_image = value.into_string(),
            "series" => self.series = value.into_string(),
            "published" => {
                self.published = match value.into_string().as_deref().map(str::trim) {
                    None => None,
                    Some("true") => Some(true),
                    Some("false") => Some(false),
                    Some(other) => {
                        return Err(ContentError::InvalidFrontMatter {
                            line,
                            message: format!("`published` must be true or false, found {:?}", other),
                        })
                    }
                }
            }
            "seriesOrder" => {
                self.series_order = match value.into_string() {
                    None => None,
                    Some(raw) => Some(raw.trim().parse().map_err(|_| {
                        ContentError::InvalidFrontMatter {
                            line,
                            message: format!("`seriesOrder` must be an integer, found {:?}", raw),
                        }
                    })?),
                }
            }
            other => tracing::debug!("Ignoring unknown front-matter key {:?}", other),
        }
        Ok(())
    }

    /// Serialize back into a `---` delimited block
    pub fn to_block(&self) -> String {
        let mut out = String::from("---\n");

        let scalars = [
            ("title", &self.title),
            ("excerpt", &self.excerpt),
            ("publishedDate", &self.published_date),
            ("updatedDate", &self.updated_date),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                out.push_str(&format!("{}: {}\n", key, quote(value)));
            }
        }
        if !self.tags.is_empty() {
            let items: Vec<String> = self.tags.iter().map(|t| quote(t)).collect();
            out.push_str(&format!("tags: [{}]\n", items.join(", ")));
        }
        if let Some(category) = &self.category {
            out.push_str(&format!("category: {}\n", quote(category)));
        }
        if let Some(image) = &self.featured_image {
            out.push_str(&format!("featuredImage: {}\n", quote(image)));
        }
        if let Some(published) = self.published {
            out.push_str(&format!("published: {}\n", published));
        }
        if let Some(series) = &self.series {
            out.push_str(&format!("series: {}\n", quote(series)));
        }
        if let Some(order) = self.series_order {
            out.push_str(&format!("seriesOrder: {}\n", order));
        }

        out.push_str("---\n");
        out
    }

    /// Whether the post should be listed; defaults to true
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(true)
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}
