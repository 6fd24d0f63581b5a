pub mod site;


pub use site::{CrawlState, SiteCrawler, crawl_site, crawl_sites};
