//! Recursive discovery of a remote directory tree from nested listing pages.
//!
//! Each listing page is one directory. Rows whose link ends with `/` are
//! subdirectories and are crawled recursively; every other row is a file.
//! Sibling subdirectories are fetched concurrently, but results are gathered
//! in listing order, so the snapshot is the same whatever order fetches
//! complete in. A node is returned only once its files and children are
//! fully built.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info};
use url::Url;

use crate::catalog::parse_dir_url;
use crate::fetch::PageFetcher;
use crate::listing::{Row, TableLayout};
use crate::types::{DatasetError, DatasetResult, DirectoryEntry, FileEntry};

/// Default number of listing pages fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Name given to the root node when the caller has none.
pub const DEFAULT_ROOT_NAME: &str = "root";

/// Builds `DirectoryEntry` snapshots by walking listing pages.
#[derive(Clone)]
pub struct TreeCrawler {
    fetcher: Arc<dyn PageFetcher>,
    permits: Arc<Semaphore>,
    concurrency: usize,
}

/// A listing row, classified.
#[derive(Debug, PartialEq)]
enum Listed {
    File(FileEntry),
    Directory { url: Url, name: String },
}

impl TreeCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            permits: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit the number of listing pages in flight across the whole crawl.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self.permits = Arc::new(Semaphore::new(self.concurrency));
        self
    }

    /// Crawl the tree rooted at `root_url`.
    ///
    /// Fails fast: the first page that cannot be fetched or parsed aborts the
    /// crawl with an error naming that page.
    pub async fn crawl(&self, root_url: &str, root_name: &str) -> DatasetResult<DirectoryEntry> {
        let root = parse_dir_url(root_url)?;
        info!(url = %root, name = root_name, "crawling");

        let tree = self.crawl_dir(root, root_name.to_string()).await?;

        info!(
            files = tree.file_count(),
            directories = tree.dir_count(),
            "crawl complete"
        );
        Ok(tree)
    }

    fn crawl_dir(&self, url: Url, name: String) -> BoxFuture<'_, DatasetResult<DirectoryEntry>> {
        async move {
            let rows = {
                let _permit = self.permits.acquire().await.map_err(|e| {
                    DatasetError::Retrieval {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                self.fetcher
                    .fetch_rows(url.as_str(), TableLayout::LISTING)
                    .await?
            };
            debug!(url = %url, rows = rows.len(), "listing fetched");

            let mut files = Vec::new();
            let mut subdirs = Vec::new();
            for row in &rows {
                match classify(row, &url)? {
                    Listed::File(file) => files.push(file),
                    Listed::Directory { url, name } => subdirs.push((url, name)),
                }
            }

            let children = stream::iter(subdirs)
                .map(|(child_url, child_name)| self.crawl_dir(child_url, child_name))
                .buffered(self.concurrency)
                .try_collect::<Vec<_>>()
                .await?;

            Ok(DirectoryEntry::new(name, url.to_string(), files, children))
        }
        .boxed()
    }
}

/// Classify one data row of the listing at `base`.
///
/// The first cell is the icon column; the rest are name, last-modified,
/// size, and description.
fn classify(row: &Row, base: &Url) -> DatasetResult<Listed> {
    let href = row
        .href()
        .ok_or_else(|| DatasetError::parse(base.as_str(), "listing row without a link"))?;
    let columns = row.cells.get(1..).unwrap_or_default();
    let name = columns
        .first()
        .ok_or_else(|| DatasetError::parse(base.as_str(), "listing row without a name column"))?;

    let target = base.join(href).map_err(|e| DatasetError::InvalidUrl {
        url: href.to_string(),
        reason: e.to_string(),
    })?;

    if href.ends_with('/') {
        let name = name.strip_suffix('/').unwrap_or(name).to_string();
        return Ok(Listed::Directory { url: target, name });
    }

    match columns {
        [name, last_modified, size, description, ..] => Ok(Listed::File(FileEntry {
            url: target.to_string(),
            name: name.clone(),
            last_modified: last_modified.clone(),
            size: size.clone(),
            description: description.clone(),
        })),
        _ => Err(DatasetError::parse(
            base.as_str(),
            format!("file row for {href} has {} columns, expected 4", columns.len()),
        )),
    }
}
