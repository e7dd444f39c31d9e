//! Show a series

use anyhow::Result;

use crate::store::ContentStore;
use crate::Folio;

/// Print a series description and its posts in reading order
pub fn run(folio: &Folio, name: &str) -> Result<()> {
    let store = folio.store()?;
    print!("{}", render(&store, name)?);
    Ok(())
}

pub fn render(store: &ContentStore, name: &str) -> Result<String> {
    let Some(info) = store.get_series_info(name) else {
        anyhow::bail!("No series named: {}", name);
    };

    let mut out = format!("{} ({} posts)\n{}\n", info.name, info.total_count, info.description);
    for (i, post) in info.items.iter().enumerate() {
        out.push_str(&format!("  {}. {} [{}]\n", i + 1, post.title, post.slug));
    }
    Ok(out)
}
