//! Shared helpers: an in-memory fetcher and HTML page builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use datamirror::{DatasetError, DatasetResult, FetchedFile, PageFetcher};

pub const BASE: &str = "https://archive.test/ml/";

/// Serves pages and files from memory and records every request.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    files: HashMap<String, (u16, Vec<u8>)>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn file(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.to_string(), (status, body.into()));
        self
    }

    /// Delay responses for `url`, to shuffle completion order.
    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    async fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_html(&self, url: &str) -> DatasetResult<String> {
        self.record(url).await;
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| DatasetError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    async fn fetch_file(&self, url: &str) -> DatasetResult<FetchedFile> {
        self.record(url).await;
        Ok(match self.files.get(url) {
            Some((status, bytes)) => FetchedFile {
                status: *status,
                bytes: bytes.clone(),
            },
            None => FetchedFile {
                status: 404,
                bytes: Vec::new(),
            },
        })
    }
}

/// A directory listing page: three chrome rows, one row per entry, one footer row.
///
/// Entries are `(href, size)`; hrefs ending with `/` are directories.
pub fn listing_page(entries: &[(&str, &str)]) -> String {
    let mut html = String::from(
        r#"<html><body><h1>Index</h1><table>
<tr><th valign="top"><img src="/icons/blank.gif" alt="[ICO]"></th><th><a href="?C=N;O=D">Name</a></th><th><a href="?C=M;O=A">Last modified</a></th><th><a href="?C=S;O=A">Size</a></th><th><a href="?C=D;O=A">Description</a></th></tr>
<tr><th colspan="5"><hr></th></tr>
<tr><td valign="top"><img src="/icons/back.gif" alt="[PARENTDIR]"></td><td><a href="../">Parent Directory</a></td><td>&nbsp;</td><td align="right">  - </td><td>&nbsp;</td></tr>
"#,
    );
    for (href, size) in entries {
        html.push_str(&format!(
            r#"<tr><td valign="top"><img src="/icons/unknown.gif" alt="[   ]"></td><td><a href="{href}">{href}</a></td><td align="right">2019-12-05 10:49  </td><td align="right">{size}</td><td>&nbsp;</td></tr>
"#
        ));
    }
    html.push_str("<tr><th colspan=\"5\"><hr></th></tr>\n</table></body></html>");
    html
}

/// A catalog page whose sixth table lists `(title, href)` pairs after a header row.
pub fn catalog_page(entries: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..5 {
        html.push_str(&format!("<table><tr><td>layout {i}</td></tr></table>"));
    }
    html.push_str("<table><tr><td>Name</td><td>Data Types</td></tr>");
    for (title, href) in entries {
        html.push_str(&format!(
            r#"<tr><td><a href="{href}"><img src="thumb.jpg"></a></td><td><a href="{href}"><font>{title}</font></a></td><td>Multivariate</td></tr>"#
        ));
    }
    html.push_str("</table></body></html>");
    html
}

/// A dataset detail page linking to its data folder.
pub fn detail_page(folder_href: &str) -> String {
    format!(
        r##"<html><body><p><a href="{folder_href}"><font size="4" color="#003366">Data Folder</font></a>,
        <a href="../machine-learning-databases/names"><font size="4">Data Set Description</font></a></p></body></html>"##
    )
}
