//! `datamirror tree <dataset-slug>`: show a dataset's remote files without downloading.

use std::io::Write;

use anyhow::Result;
use datamirror::{unslug, DirectoryEntry};

use super::App;

pub async fn run(app: &App, slug: &str, out: &mut dyn Write) -> Result<()> {
    let name = unslug(slug);
    let entry = app.lookup(slug).await?;
    let tree = app.discover(&entry, &name).await?;

    if app.config.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&tree)?)?;
        return Ok(());
    }
    render(&tree, 0, out)?;
    writeln!(
        out,
        "{} file(s) in {} folder(s)",
        tree.file_count(),
        tree.dir_count() + 1
    )?;
    Ok(())
}

/// Indented listing: directories end with `/`, files show size and date.
pub fn render(dir: &DirectoryEntry, depth: usize, out: &mut dyn Write) -> std::io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(out, "{indent}{}/", dir.name)?;
    for file in &dir.files {
        write!(out, "{indent}  {:<32} {:>8}  {}", file.name, file.size, file.last_modified)?;
        if file.description.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, "  {}", file.description)?;
        }
    }
    for child in &dir.children {
        render(child, depth + 1, out)?;
    }
    Ok(())
}
