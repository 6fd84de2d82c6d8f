//! `datamirror get <dataset-slug>`: download a dataset's file tree.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use datamirror::{unslug, ContentMode, Mirror, MirrorEvent, MirrorReport};
use tokio::sync::mpsc;

use super::App;

/// Options for the get command.
#[derive(Debug, Clone)]
pub struct GetOptions {
    /// Directory the dataset folder is created in.
    pub out_dir: PathBuf,
    /// Write bytes verbatim instead of decoding as text.
    pub raw: bool,
}

/// Resolve, crawl, and mirror a dataset under `<out_dir>/<dataset name>`.
///
/// Prints the dataset name, then each file as it is written and a diagnostic
/// line per failed file. Failed files do not fail the command.
pub async fn run(
    app: &App,
    slug: &str,
    options: &GetOptions,
    out: &mut dyn Write,
) -> Result<MirrorReport> {
    let name = unslug(slug);
    let entry = app.lookup(slug).await?;
    let json = app.config.json;
    if !json {
        writeln!(out, "{name}")?;
    }

    let tree = app.discover(&entry, &name).await?;

    let mode = if options.raw {
        ContentMode::Raw
    } else {
        ContentMode::Text
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mirror = Mirror::new(app.fetcher.clone(), options.out_dir.clone())
        .with_concurrency(app.config.concurrency)
        .with_mode(mode)
        .with_progress(tx);

    let mirroring = mirror.mirror(&tree, &name);
    tokio::pin!(mirroring);
    let result = loop {
        tokio::select! {
            result = &mut mirroring => break result,
            Some(event) = rx.recv() => {
                if !json {
                    print_event(&event, out)?;
                }
            }
        }
    };
    while let Ok(event) = rx.try_recv() {
        if !json {
            print_event(&event, out)?;
        }
    }

    let report = result.with_context(|| format!("mirroring {name}"))?;
    let dest = options.out_dir.join(&name);
    if json {
        let summary = serde_json::json!({
            "dataset": &entry.title,
            "destination": &dest,
            "written": &report.written,
            "failures": &report.failures,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        writeln!(
            out,
            "Mirrored {} file(s) into {} ({} failed)",
            report.written.len(),
            dest.display(),
            report.failures.len()
        )?;
    }
    Ok(report)
}

fn print_event(event: &MirrorEvent, out: &mut dyn Write) -> std::io::Result<()> {
    match event {
        MirrorEvent::DirectoryStarted { .. } => Ok(()),
        MirrorEvent::FileWritten { name, .. } => writeln!(out, "{name}"),
        MirrorEvent::FileFailed(failure) => match failure.status {
            Some(status) => writeln!(
                out,
                "[ERR] Request for {} failed with code {status}",
                failure.name
            ),
            None => writeln!(
                out,
                "[ERR] Request for {} failed: {}",
                failure.name, failure.reason
            ),
        },
    }
}
