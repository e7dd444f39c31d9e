//! Check every content file and report the ones the store skips

use anyhow::Result;

use crate::store::{LoadOutcome, LoadReport};
use crate::Folio;

/// Print a per-file report; fails if any file was rejected
pub fn run(folio: &Folio) -> Result<()> {
    let store = folio.store()?;
    let report = store.diagnose();
    print!("{}", render(&report));

    if report.source_error.is_some() {
        anyhow::bail!("Content directory could not be read: {:?}", folio.content_dir);
    }
    if !report.is_clean() {
        anyhow::bail!("{} content file(s) could not be loaded", report.rejected());
    }
    Ok(())
}

/// Format a load report, one line per file
pub fn render(report: &LoadReport) -> String {
    if let Some(e) = &report.source_error {
        return format!("error: {}\n", e);
    }

    let mut out = String::new();
    for entry in &report.entries {
        let line = match &entry.outcome {
            LoadOutcome::Loaded { slug } => format!("  ok       {} -> {}\n", entry.source, slug),
            LoadOutcome::Unpublished { slug } => {
                format!("  draft    {} -> {}\n", entry.source, slug)
            }
            LoadOutcome::Rejected(e) => format!("  error    {}: {}\n", entry.source, e),
        };
        out.push_str(&line);
    }
    for slug in &report.duplicate_slugs {
        out.push_str(&format!("  warning  duplicate slug: {}\n", slug));
    }
    out.push_str(&format!(
        "{} loaded, {} unpublished, {} rejected\n",
        report.loaded(),
        report.unpublished(),
        report.rejected()
    ));
    out
}
