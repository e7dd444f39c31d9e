//! List site content

use anyhow::Result;

use crate::store::ContentStore;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let store = folio.store()?;
    print!("{}", render(&store, content_type)?);
    Ok(())
}

/// Format a listing of the given content type
pub fn render(store: &ContentStore, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = store.load_all();
            out.push_str(&format!("Posts ({}):\n", posts.len()));
            for post in posts.iter() {
                out.push_str(&format!(
                    "  {} - {} [{}] ({} min)\n",
                    post.published_date.format("%Y-%m-%d"),
                    post.title,
                    post.slug,
                    post.read_time
                ));
            }
        }
        "tag" | "tags" => {
            let tags = store.list_tags();
            out.push_str(&format!("Tags ({}):\n", tags.len()));
            for tag in tags {
                let count = store.get_by_tag(&tag).len();
                out.push_str(&format!("  {} ({})\n", tag, count));
            }
        }
        "category" | "categories" => {
            let categories = store.list_categories();
            out.push_str(&format!("Categories ({}):\n", categories.len()));
            for category in categories {
                let count = store.get_by_category(&category).len();
                out.push_str(&format!("  {} ({})\n", category, count));
            }
        }
        "series" => {
            let names = store.list_series_names();
            out.push_str(&format!("Series ({}):\n", names.len()));
            for name in names {
                let count = store.get_by_series(&name).len();
                out.push_str(&format!("  {} ({})\n", name, count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category, series",
                content_type
            );
        }
    }

    Ok(out)
}
