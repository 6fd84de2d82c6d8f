//! DataMirror - discover, search, and mirror datasets published as nested HTML directory listings.

pub mod catalog;
pub mod crawler;
pub mod fetch;
pub mod listing;
pub mod mirror;
pub mod similarity;
pub mod types;

pub use catalog::{
    distinct_titles, find_by_slug, find_exact, search, slugify, unslug, CatalogResolver,
    DEFAULT_BASE_URL,
};
pub use crawler::TreeCrawler;
pub use fetch::{FetchConfig, FetchedFile, HttpFetcher, PageFetcher};
pub use listing::{Link, Row, TableLayout};
pub use mirror::{ContentMode, FileFailure, Mirror, MirrorEvent, MirrorReport};
pub use similarity::{edit_distance, is_similar, similarity_ratio, SIMILARITY_THRESHOLD};
pub use types::*;
