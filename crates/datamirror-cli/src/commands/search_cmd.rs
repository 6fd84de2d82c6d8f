//! `datamirror search <query>`: fuzzy search the catalog.

use std::io::Write;

use anyhow::Result;
use datamirror::search;

use super::App;

/// Print one matching slug per line. No matches prints nothing.
pub async fn run(app: &App, query: &str, out: &mut dyn Write) -> Result<()> {
    let catalog = app.catalog().await?;
    let results = search(query, &catalog);
    tracing::debug!(query, hits = results.len(), "search complete");

    if app.config.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&results)?)?;
        return Ok(());
    }
    for slug in &results {
        writeln!(out, "{slug}")?;
    }
    Ok(())
}
