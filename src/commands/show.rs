//! Show a single post

use anyhow::Result;

use crate::store::ContentStore;
use crate::Folio;

/// Print a post's metadata, series position and body
pub fn run(folio: &Folio, slug: &str) -> Result<()> {
    let store = folio.store()?;
    print!("{}", render(&store, slug)?);
    Ok(())
}

pub fn render(store: &ContentStore, slug: &str) -> Result<String> {
    let Some(post) = store.get_by_slug(slug) else {
        anyhow::bail!("No published post with slug: {}", slug);
    };

    let mut out = format!("{}\n", post.title);
    out.push_str(&format!("  slug:      {}\n", post.slug));
    out.push_str(&format!("  source:    {}\n", post.source));
    out.push_str(&format!(
        "  published: {}\n",
        post.published_date.format("%Y-%m-%d")
    ));
    if let Some(updated) = post.updated_date {
        out.push_str(&format!("  updated:   {}\n", updated.format("%Y-%m-%d")));
    }
    out.push_str(&format!("  category:  {}\n", post.category));
    if !post.tags.is_empty() {
        out.push_str(&format!("  tags:      {}\n", post.tags.join(", ")));
    }
    if let Some(image) = &post.featured_image {
        out.push_str(&format!("  image:     {}\n", image));
    }
    out.push_str(&format!("  read time: {} min\n", post.read_time));

    if let (Some(series), Some(nav)) = (&post.series, store.get_series_navigation(&post)) {
        out.push_str(&format!(
            "  series:    {} ({} of {})\n",
            series, nav.position, nav.total
        ));
        if let Some(prev) = nav.previous {
            out.push_str(&format!("  previous:  {}\n", prev.slug));
        }
        if let Some(next) = nav.next {
            out.push_str(&format!("  next:      {}\n", next.slug));
        }
    }

    out.push_str(&format!("\n{}\n\n{}", post.excerpt, post.content));
    Ok(out)
}
