//! Replicate a tree snapshot on local storage.
//!
//! The walk is depth-first: a directory's files are written before any of
//! its subdirectories are entered, and both follow listing order. A file
//! that cannot be fetched is reported and skipped; only local I/O failures
//! abort the mirror.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::fetch::PageFetcher;
use crate::types::{DatasetError, DatasetResult, DirectoryEntry, FileEntry};

/// Default number of files fetched at once within a directory.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// How fetched bytes are written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// Decode as UTF-8, falling back to ISO-8859-1, and write UTF-8 text.
    #[default]
    Text,
    /// Write the bytes exactly as received.
    Raw,
}

/// A file that could not be mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub name: String,
    pub url: String,
    /// HTTP status when the server answered with a non-success code.
    pub status: Option<u16>,
    pub reason: String,
}

/// Outcome of a mirror run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MirrorReport {
    /// Local paths written, in walk order.
    pub written: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl MirrorReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress notifications emitted while mirroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    DirectoryStarted { path: PathBuf },
    FileWritten { name: String, path: PathBuf },
    FileFailed(FileFailure),
}

/// Writes a `DirectoryEntry` tree under a destination root.
#[derive(Clone)]
pub struct Mirror {
    fetcher: Arc<dyn PageFetcher>,
    dest_root: PathBuf,
    concurrency: usize,
    mode: ContentMode,
    progress: Option<UnboundedSender<MirrorEvent>>,
}

impl Mirror {
    pub fn new(fetcher: Arc<dyn PageFetcher>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            dest_root: dest_root.into(),
            concurrency: DEFAULT_CONCURRENCY,
            mode: ContentMode::default(),
            progress: None,
        }
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn with_mode(mut self, mode: ContentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Send progress events to `tx`. Events are dropped once the receiver is gone.
    pub fn with_progress(mut self, tx: UnboundedSender<MirrorEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Mirror `tree` into `<dest_root>/<dataset_name>`.
    pub async fn mirror(
        &self,
        tree: &DirectoryEntry,
        dataset_name: &str,
    ) -> DatasetResult<MirrorReport> {
        let root = self.dest_root.join(dataset_name);
        info!(dataset = dataset_name, dest = %root.display(), "mirroring");

        let mut report = MirrorReport::default();
        for (relative, dir) in tree.walk() {
            let dir_path = local_dir(&root, &relative, dir)?;
            self.emit(MirrorEvent::DirectoryStarted {
                path: dir_path.clone(),
            });
            self.mirror_files(dir, &dir_path, &mut report).await?;
        }

        info!(
            written = report.written.len(),
            failed = report.failures.len(),
            "mirror complete"
        );
        Ok(report)
    }

    async fn mirror_files(
        &self,
        dir: &DirectoryEntry,
        dir_path: &Path,
        report: &mut MirrorReport,
    ) -> DatasetResult<()> {
        let mut fetched = stream::iter(&dir.files)
            .map(|file| async move { (file, self.fetch_content(file).await) })
            .buffered(self.concurrency);

        while let Some((file, outcome)) = fetched.next().await {
            match outcome {
                Ok(content) => {
                    let path = dir_path.join(&file.name);
                    write_file(&path, &content).await?;
                    debug!(path = %path.display(), bytes = content.len(), "wrote file");
                    self.emit(MirrorEvent::FileWritten {
                        name: file.name.clone(),
                        path: path.clone(),
                    });
                    report.written.push(path);
                }
                Err(failure) => {
                    warn!(
                        file = %failure.name,
                        status = ?failure.status,
                        reason = %failure.reason,
                        "skipping file"
                    );
                    self.emit(MirrorEvent::FileFailed(failure.clone()));
                    report.failures.push(failure);
                }
            }
        }
        Ok(())
    }

    async fn fetch_content(&self, file: &FileEntry) -> Result<Vec<u8>, FileFailure> {
        let failure = |status: Option<u16>, reason: String| FileFailure {
            name: file.name.clone(),
            url: file.url.clone(),
            status,
            reason,
        };

        if !is_plain_name(&file.name) {
            return Err(failure(None, "unsafe local file name".to_string()));
        }

        let fetched = match self.fetcher.fetch_file(&file.url).await {
            Ok(fetched) => fetched,
            Err(DatasetError::Status { status, .. }) => {
                return Err(failure(Some(status), format!("status {status}")));
            }
            Err(e) => return Err(failure(None, e.to_string())),
        };
        if !fetched.is_success() {
            return Err(failure(
                Some(fetched.status),
                format!("status {}", fetched.status),
            ));
        }

        Ok(match self.mode {
            ContentMode::Text => decode_text(fetched.bytes).into_bytes(),
            ContentMode::Raw => fetched.bytes,
        })
    }

    fn emit(&self, event: MirrorEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event);
        }
    }
}

/// Decode as UTF-8; if that fails, decode once more as ISO-8859-1.
///
/// ISO-8859-1 maps every byte to a code point, so the second attempt always succeeds.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
    }
}

/// True when `name` is a single normal path component.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn local_dir(root: &Path, relative: &str, dir: &DirectoryEntry) -> DatasetResult<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        if !is_plain_name(segment) {
            return Err(DatasetError::parse(
                &dir.source_url,
                format!("unsafe directory name {segment:?}"),
            ));
        }
        path.push(segment);
    }
    Ok(path)
}

async fn write_file(path: &Path, content: &[u8]) -> DatasetResult<()> {
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    tokio::fs::write(path, content).await.map_err(io_err)
}
