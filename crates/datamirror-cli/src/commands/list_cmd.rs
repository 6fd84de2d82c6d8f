//! `datamirror list-remote`: list every distinct catalog title.

use std::io::Write;

use anyhow::Result;
use datamirror::distinct_titles;

use super::App;

/// Print each distinct title once, in catalog order.
pub async fn run(app: &App, out: &mut dyn Write) -> Result<()> {
    let catalog = app.catalog().await?;
    let titles = distinct_titles(&catalog);

    if app.config.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&titles)?)?;
        return Ok(());
    }
    for title in titles {
        writeln!(out, "{title}")?;
    }
    Ok(())
}
