//! Dataset catalog retrieval and exact/fuzzy lookup.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::fetch::PageFetcher;
use crate::listing::{self, TableLayout};
use crate::similarity::is_similar;
use crate::types::{CatalogEntry, DatasetError, DatasetResult};

/// Root of the public dataset repository.
pub const DEFAULT_BASE_URL: &str = "https://archive.ics.uci.edu/ml/";

/// Catalog page, relative to the base URL.
pub const CATALOG_PAGE: &str = "datasets.html";

/// Anchor text of the link from a detail page to the dataset's file listing.
const DATA_FOLDER_LINK: &str = "Data Folder";

/// Position of the title anchor within a catalog row (the first is a thumbnail).
const TITLE_LINK_INDEX: usize = 1;

/// Fetches the remote catalog and resolves entries to their file listings.
#[derive(Clone)]
pub struct CatalogResolver {
    fetcher: Arc<dyn PageFetcher>,
    base: Url,
}

impl CatalogResolver {
    /// Create a resolver rooted at `base_url`. A missing trailing `/` is added.
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: &str) -> DatasetResult<Self> {
        Ok(Self {
            fetcher,
            base: parse_dir_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn catalog_url(&self) -> DatasetResult<String> {
        self.normalize_url(CATALOG_PAGE)
    }

    /// Make a catalog href absolute. Absolute hrefs are returned unchanged.
    pub fn normalize_url(&self, href: &str) -> DatasetResult<String> {
        self.base
            .join(href.trim())
            .map(|u| u.to_string())
            .map_err(|e| DatasetError::InvalidUrl {
                url: href.to_string(),
                reason: e.to_string(),
            })
    }

    /// Fetch every catalog entry in document order. Duplicate titles are kept.
    pub async fn fetch_catalog(&self) -> DatasetResult<Vec<CatalogEntry>> {
        let url = self.catalog_url()?;
        let rows = self.fetcher.fetch_rows(&url, TableLayout::CATALOG).await?;

        let entries = rows
            .iter()
            .map(|row| {
                let link = row.links.get(TITLE_LINK_INDEX).ok_or_else(|| {
                    DatasetError::parse(&url, "catalog row without a title link")
                })?;
                Ok(CatalogEntry::new(link.text.as_str(), self.normalize_url(&link.href)?))
            })
            .collect::<DatasetResult<Vec<_>>>()?;

        info!(count = entries.len(), "fetched catalog");
        Ok(entries)
    }

    /// Follow a dataset's detail page to the root listing URL of its files.
    pub async fn resolve_data_folder(&self, entry: &CatalogEntry) -> DatasetResult<String> {
        let html = self.fetcher.fetch_html(&entry.url).await?;
        let href = listing::find_link_by_text(&html, DATA_FOLDER_LINK).ok_or_else(|| {
            DatasetError::parse(&entry.url, "detail page has no data folder link")
        })?;

        let detail = Url::parse(&entry.url).map_err(|e| DatasetError::InvalidUrl {
            url: entry.url.clone(),
            reason: e.to_string(),
        })?;
        let folder = detail.join(&href).map_err(|e| DatasetError::InvalidUrl {
            url: href.clone(),
            reason: e.to_string(),
        })?;

        debug!(title = %entry.title, folder = %folder, "resolved data folder");
        Ok(folder.to_string())
    }
}

/// Parse a URL that names a directory, forcing a trailing `/` so joins descend.
pub(crate) fn parse_dir_url(raw: &str) -> DatasetResult<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| DatasetError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// Case-insensitive exact title match. The first match in catalog order wins.
pub fn find_exact<'a>(name: &str, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    let wanted = name.to_lowercase();
    catalog.iter().find(|e| e.title.to_lowercase() == wanted)
}

/// Resolve a CLI slug to a catalog entry.
///
/// Tries the exact title with hyphens read as spaces first, then falls back to
/// comparing slugs so titles that contain hyphens of their own still resolve.
pub fn find_by_slug<'a>(slug: &str, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    find_exact(&unslug(slug), catalog).or_else(|| {
        let wanted = slug.to_lowercase();
        catalog.iter().find(|e| slugify(&e.title) == wanted)
    })
}

/// Titles matching `query` by substring or by similarity, as sorted unique slugs.
pub fn search(query: &str, catalog: &[CatalogEntry]) -> Vec<String> {
    let query = query.to_lowercase();
    let hits: BTreeSet<String> = catalog
        .iter()
        .filter(|e| {
            let title = e.title.to_lowercase();
            title.contains(&query) || is_similar(&query, &title)
        })
        .map(|e| slugify(&e.title))
        .collect();
    hits.into_iter().collect()
}

/// Lowercase display form with whitespace runs replaced by a single hyphen.
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Read a slug back as a title: hyphens become spaces.
pub fn unslug(slug: &str) -> String {
    slug.replace('-', " ")
}

/// Unique titles in first-seen order.
pub fn distinct_titles(catalog: &[CatalogEntry]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    catalog
        .iter()
        .map(|e| e.title.as_str())
        .filter(|t| seen.insert(*t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(titles: &[&str]) -> Vec<CatalogEntry> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| CatalogEntry::new(*t, format!("https://example.com/datasets/{i}")))
            .collect()
    }

    #[test]
    fn test_search_substring_and_fuzzy() {
        let cat = catalog(&["Iris", "Iris Plants Database", "Wine"]);
        assert_eq!(search("iris", &cat), vec!["iris", "iris-plants-database"]);
        assert_eq!(search("IRIS", &cat), vec!["iris", "iris-plants-database"]);
    }

    #[test]
    fn test_search_fuzzy_only_hit() {
        let cat = catalog(&["Abalone", "Adult", "Car Evaluation"]);
        assert_eq!(search("abalon", &cat), vec!["abalone"]);
        assert_eq!(search("abalobe", &cat), vec!["abalone"]);
    }

    #[test]
    fn test_search_includes_ratio_at_threshold() {
        // abcfg scores exactly 0.60 against abcde, abfgh only 0.40
        let cat = catalog(&["Abcfg", "Abfgh"]);
        assert_eq!(search("abcde", &cat), vec!["abcfg"]);
    }

    #[test]
    fn test_search_sorted_and_unique() {
        let cat = catalog(&["Wine Quality", "wine", "Wine", "Wine  Quality"]);
        let results = search("wine", &cat);
        assert_eq!(results, vec!["wine", "wine-quality"]);
        let mut sorted = results.clone();
        sorted.sort();
        assert_eq!(results, sorted);
    }

    #[test]
    fn test_search_no_hits() {
        let cat = catalog(&["Iris", "Wine"]);
        assert!(search("zzzzzzzz", &cat).is_empty());
        assert!(search("anything", &[]).is_empty());
    }

    #[test]
    fn test_find_exact_case_insensitive() {
        let cat = catalog(&["Wine", "Iris Plants"]);
        let a = find_exact("Iris Plants", &cat).unwrap();
        let b = find_exact("iris plants", &cat).unwrap();
        assert_eq!(a, b);
        assert!(find_exact("iris", &cat).is_none());
    }

    #[test]
    fn test_find_exact_first_duplicate_wins() {
        let cat = vec![
            CatalogEntry::new("Iris", "https://example.com/first"),
            CatalogEntry::new("Iris", "https://example.com/second"),
        ];
        assert_eq!(find_exact("iris", &cat).unwrap().url, "https://example.com/first");
    }

    #[test]
    fn test_find_by_slug() {
        let cat = catalog(&["Iris Plants", "Wine-Quality Red"]);
        assert_eq!(find_by_slug("iris-plants", &cat).unwrap().title, "Iris Plants");
        assert_eq!(
            find_by_slug("wine-quality-red", &cat).unwrap().title,
            "Wine-Quality Red"
        );
        assert!(find_by_slug("adult", &cat).is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Iris Plants"), "iris-plants");
        assert_eq!(slugify("  Wine\tQuality  "), "wine-quality");
        assert_eq!(slugify("Iris"), "iris");
        assert_eq!(unslug("iris-plants"), "iris plants");
    }

    #[test]
    fn test_distinct_titles_first_seen_order() {
        let cat = catalog(&["Wine", "Iris", "Wine", "Adult"]);
        assert_eq!(distinct_titles(&cat), vec!["Wine", "Iris", "Adult"]);
    }

    #[test]
    fn test_parse_dir_url_adds_trailing_slash() {
        let url = parse_dir_url("https://example.com/ml").unwrap();
        assert_eq!(url.as_str(), "https://example.com/ml/");
        assert!(parse_dir_url("not a url").is_err());
    }
}
