//! Core data types for catalog entries, directory-tree snapshots, and errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A dataset as published by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Detail-page URL, always absolute.
    pub url: String,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A leaf file discovered on a listing page.
///
/// `url` is absolute: it is resolved against the parent directory's
/// listing URL when the tree is crawled. The descriptive fields are carried
/// through verbatim for display and are empty when the listing left them blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub url: String,
    pub name: String,
    pub last_modified: String,
    pub size: String,
    pub description: String,
}

/// One directory of a remote tree snapshot.
///
/// Children are owned exclusively by their parent. `files` and `children`
/// keep the order in which rows appeared on the remote listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    /// Listing URL this directory was discovered at (ends with `/`).
    pub source_url: String,
    pub files: Vec<FileEntry>,
    pub children: Vec<DirectoryEntry>,
}

impl DirectoryEntry {
    /// Build a fully populated directory node.
    pub fn new(
        name: impl Into<String>,
        source_url: impl Into<String>,
        files: Vec<FileEntry>,
        children: Vec<DirectoryEntry>,
    ) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
            files,
            children,
        }
    }

    /// Total number of files in this directory and all descendants.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(|c| c.file_count()).sum::<usize>()
    }

    /// Number of descendant directories (excluding `self`).
    pub fn dir_count(&self) -> usize {
        self.children.len() + self.children.iter().map(|c| c.dir_count()).sum::<usize>()
    }

    /// Pre-order walk yielding each directory with its path relative to `self`.
    ///
    /// The root is yielded with an empty path; descendants as `/a`, `/a/b`, ...
    pub fn walk(&self) -> Vec<(String, &DirectoryEntry)> {
        let mut out = Vec::new();
        self.walk_into(String::new(), &mut out);
        out
    }

    fn walk_into<'a>(&'a self, path: String, out: &mut Vec<(String, &'a DirectoryEntry)>) {
        out.push((path.clone(), self));
        for child in &self.children {
            child.walk_into(format!("{path}/{}", child.name), out);
        }
    }
}

/// Errors that can occur while resolving, crawling, or mirroring a dataset.
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The page or file could not be reached.
    #[error("Request to {url} failed: {reason}")]
    Retrieval { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The page did not have the expected table or row shape.
    #[error("Unexpected page layout at {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DatasetError {
    pub(crate) fn parse(url: &str, reason: impl Into<String>) -> Self {
        DatasetError::Parse {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures reaching the remote side (transport or status).
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            DatasetError::Retrieval { .. } | DatasetError::Status { .. }
        )
    }
}

/// Convenience result type.
pub type DatasetResult<T> = Result<T, DatasetError>;
