//! Crawls a company website with a real browser and returns its pages,
//! classified by what kind of page they are, for downstream extraction.

pub mod classify;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod parsers;
pub mod renderer;
pub mod results;
pub mod safety;

// Re-export commonly used types for convenience
pub use classify::{PageType, classify};
pub use config::CrawlerConfig;
pub use crawlers::{CrawlState, SiteCrawler, crawl_site, crawl_sites};
pub use error::{CrawlError, FetchError};
pub use parsers::{extract_links, extract_text};
pub use renderer::{Renderer, Snapshot, WebDriverRenderer};
pub use results::PageRecord;
