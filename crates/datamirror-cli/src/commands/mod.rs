//! Command implementations for the `datamirror` binary.
//!
//! Each command writes its output to a caller-supplied writer so the same
//! code serves the binary (stdout) and the tests (a buffer).

pub mod get_cmd;
pub mod list_cmd;
pub mod search_cmd;
pub mod tree_cmd;

use std::sync::Arc;

use anyhow::{Context, Result};
use datamirror::{
    find_by_slug, unslug, CatalogEntry, CatalogResolver, DatasetError, DirectoryEntry,
    HttpFetcher, PageFetcher, TreeCrawler,
};

use crate::config::CliConfig;

/// Shared state for one command invocation.
pub struct App {
    pub config: CliConfig,
    pub fetcher: Arc<dyn PageFetcher>,
    pub resolver: CatalogResolver,
}

impl App {
    /// Build an app backed by the HTTP fetcher.
    pub fn new(config: CliConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch_config()).context("creating HTTP client")?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: CliConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let resolver = CatalogResolver::new(fetcher.clone(), &config.base_url)
            .with_context(|| format!("invalid base URL {}", config.base_url))?;
        Ok(Self {
            config,
            fetcher,
            resolver,
        })
    }

    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        self.resolver
            .fetch_catalog()
            .await
            .context("fetching dataset catalog")
    }

    /// Resolve a slug to its catalog entry, or fail with `DatasetError::NotFound`.
    pub async fn lookup(&self, slug: &str) -> Result<CatalogEntry> {
        let catalog = self.catalog().await?;
        find_by_slug(slug, &catalog)
            .cloned()
            .ok_or_else(|| DatasetError::NotFound(unslug(slug)).into())
    }

    /// Resolve, locate the data folder, and crawl it. The root is named `name`.
    pub async fn discover(&self, entry: &CatalogEntry, name: &str) -> Result<DirectoryEntry> {
        let folder = self
            .resolver
            .resolve_data_folder(entry)
            .await
            .with_context(|| format!("locating files for {}", entry.title))?;
        TreeCrawler::new(self.fetcher.clone())
            .with_concurrency(self.config.concurrency)
            .crawl(&folder, name)
            .await
            .with_context(|| format!("discovering files for {}", entry.title))
    }
}
