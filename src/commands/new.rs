//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Folio;

/// Front-matter values for a new post
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub series_order: Option<i64>,
}

/// Create a new post file in the content directory and return its path
pub fn create_post(folio: &Folio, new: &NewPost) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = slug::slugify(&new.title);
    if slug.is_empty() {
        anyhow::bail!("Title {:?} does not produce a usable file name", new.title);
    }

    fs::create_dir_all(&folio.content_dir)?;
    let file_path = folio.content_dir.join(format!("{}.mdx", slug));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let fm = FrontMatter {
        title: Some(new.title.clone()),
        excerpt: Some(
            new.excerpt
                .clone()
                .unwrap_or_else(|| format!("Notes on {}.", new.title)),
        ),
        published_date: Some(now.format("%Y-%m-%d").to_string()),
        tags: new.tags.clone(),
        category: new.category.clone(),
        // New posts start as drafts
        published: Some(false),
        series: new.series.clone(),
        series_order: new.series.as_ref().and(new.series_order),
        ..FrontMatter::default()
    };

    let content = format!("{}\nWrite your post here.\n", fm.to_block());
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(folio: &Folio, new: &NewPost) -> Result<()> {
    let path = create_post(folio, new)?;
    println!("Created: {:?}", path);
    Ok(())
}
