//! Series queries - ordered groups of posts meant to be read in sequence

use serde::Serialize;
use std::collections::BTreeSet;

use super::ContentStore;
use crate::content::Post;

/// A series and its members
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInfo {
    pub name: String,
    pub description: String,
    pub items: Vec<Post>,
    pub total_count: usize,
}

/// Where a post sits within its series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesNavigation {
    pub previous: Option<Post>,
    pub next: Option<Post>,
    /// 1-based
    pub position: usize,
    pub total: usize,
}

impl ContentStore {
    /// Posts in a series, ordered by `series_order`
    pub fn get_by_series(&self, name: &str) -> Vec<Post> {
        let mut items = self.filter(|p| p.in_series(name));
        items.sort_by_key(|p| p.series_order);
        items
    }

    /// Distinct series names, sorted
    pub fn list_series_names(&self) -> Vec<String> {
        let posts = self.load_all();
        let names: BTreeSet<&str> = posts.iter().filter_map(|p| p.series.as_deref()).collect();
        names.into_iter().map(String::from).collect()
    }

    /// Description and members of a series, or `None` if it has no posts
    pub fn get_series_info(&self, name: &str) -> Option<SeriesInfo> {
        let items = self.get_by_series(name);
        if items.is_empty() {
            return None;
        }

        let description = self
            .series_descriptions
            .get(name)
            .cloned()
            .unwrap_or_else(|| default_description(name, items.len()));

        Some(SeriesInfo {
            name: name.to_string(),
            description,
            total_count: items.len(),
            items,
        })
    }

    /// Previous and next posts around `post` in its series
    pub fn get_series_navigation(&self, post: &Post) -> Option<SeriesNavigation> {
        let name = post.series.as_deref()?;
        let items = self.get_by_series(name);
        let index = items.iter().position(|p| p.source == post.source)?;

        Some(SeriesNavigation {
            previous: index.checked_sub(1).map(|i| items[i].clone()),
            next: items.get(index + 1).cloned(),
            position: index + 1,
            total: items.len(),
        })
    }
}

fn default_description(name: &str, count: usize) -> String {
    format!("A {}-part series on {}.", count, name)
}
