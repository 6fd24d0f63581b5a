use crate::classify::classify;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, FetchError};
use crate::filter::{UrlFilter, canonicalize, canonicalize_str, site_key};
use crate::frontier::Frontier;
use crate::parsers::html;
use crate::renderer::{Renderer, WebDriverRenderer};
use crate::results::PageRecord;
use crate::safety;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use url::Url;

/// Mutable state of one crawl run.
///
/// Created fresh by every call to [`SiteCrawler::crawl_with`] and never shared,
/// so concurrent crawls cannot observe each other.
#[derive(Debug)]
pub struct CrawlState {
    pub base_url: Url,
    pub domain: String,
    pub max_pages: usize,
    pub visited: HashSet<String>,
    pub frontier: Frontier,
    pub results: Vec<PageRecord>,
}

impl CrawlState {
    pub fn new(base_url: Url, max_pages: usize) -> Self {
        let domain = site_key(&base_url).unwrap_or_default();
        let frontier = Frontier::seeded(canonicalize(&base_url));
        Self {
            base_url,
            domain,
            max_pages,
            visited: HashSet::new(),
            frontier,
            results: Vec::new(),
        }
    }

    /// Whether the run should stop
    pub fn is_done(&self) -> bool {
        self.results.len() >= self.max_pages || self.frontier.is_empty()
    }

    /// Next URL that has not been visited yet, marked as visited
    pub fn next_url(&mut self) -> Option<String> {
        while self.results.len() < self.max_pages {
            let url = canonicalize_str(&self.frontier.pop()?);
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
            ::log::trace!("Skipping already visited: {}", url);
        }
        None
    }

    /// Queue the unvisited links of a fetched page
    pub fn enqueue_links(&mut self, links: &[String], filter: &UrlFilter) -> usize {
        let mut queued = 0;
        for link in links {
            if self.visited.contains(link) || !filter.should_crawl_str(link) {
                continue;
            }
            if let Some(page_type) = self.frontier.push(link.clone()) {
                ::log::trace!("Queued {} link: {}", page_type, link);
                queued += 1;
            }
        }
        queued
    }
}

/// Breadth-first crawler for a single site
pub struct SiteCrawler {
    config: CrawlerConfig,
    base_url: Url,
    filter: UrlFilter,
}

impl SiteCrawler {
    /// Validate the configuration and build a crawler for its start URL
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let base_url = safety::normalize_target(&config.start_url)?;
        if !config.allow_private_hosts {
            safety::check_target(&base_url)?;
        }
        let filter = UrlFilter::new(&base_url, &config.url_filter_config())?;

        Ok(Self {
            config,
            base_url,
            filter,
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Crawl the site through a WebDriver browser session
    pub async fn crawl(&self) -> Result<Vec<PageRecord>, CrawlError> {
        if !self.config.allow_private_hosts {
            safety::check_resolved_target(&self.base_url).await?;
        }
        let renderer = WebDriverRenderer::connect(&self.config).await?;
        self.crawl_with(renderer).await
    }

    /// Crawl the site with the given renderer.
    ///
    /// The renderer is closed before this returns, whether the crawl finished
    /// or failed.
    pub async fn crawl_with<R: Renderer>(&self, mut renderer: R) -> Result<Vec<PageRecord>, CrawlError> {
        ::log::info!(
            "Starting crawl of {} (max {} pages)",
            self.base_url,
            self.config.max_pages
        );

        let mut state = CrawlState::new(self.base_url.clone(), self.config.max_pages);
        let outcome = self.run(&mut renderer, &mut state).await;

        if let Err(e) = renderer.close().await {
            ::log::warn!("Failed to close renderer session: {}", e);
        }

        outcome?;
        ::log::info!(
            "Crawl of {} complete: {} pages, {} URLs visited",
            state.domain,
            state.results.len(),
            state.visited.len()
        );
        Ok(state.results)
    }

    async fn run<R: Renderer>(&self, renderer: &mut R, state: &mut CrawlState) -> Result<(), CrawlError> {
        while !state.is_done() {
            let Some(url) = state.next_url() else {
                break;
            };
            match self.fetch_page(renderer, &url).await {
                Ok(page) => {
                    let queued = state.enqueue_links(&page.links, &self.filter);
                    ::log::info!(
                        "Fetched [{}] {} ({} links, {} queued)",
                        page.page_type,
                        url,
                        page.links.len(),
                        queued
                    );
                    state.results.push(page);
                }
                Err(e) if e.is_fatal() => {
                    ::log::error!("Renderer session lost while fetching {}: {}", url, e);
                    return Err(CrawlError::SessionLost(e.to_string()));
                }
                Err(e) => {
                    ::log::warn!("Failed to fetch {}: {}", url, e);
                }
            }
        }
        Ok(())
    }

    /// Navigate, wait for rendering to settle, then capture and parse the page
    async fn fetch_page<R: Renderer>(&self, renderer: &mut R, url: &str) -> Result<PageRecord, FetchError> {
        let worker_start = std::time::Instant::now();

        let status = renderer.navigate(url, self.config.timeout()).await?;
        if let Some(status) = status.filter(|s| *s >= 400) {
            return Err(FetchError::HttpStatus(status));
        }

        renderer.settle(self.config.settle_delay()).await;
        let snapshot = renderer.snapshot().await?;

        // Relative links resolve against where the document ended up, which
        // keeps its trailing slash and reflects redirects.
        let document_url = snapshot
            .url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .or_else(|| Url::parse(url).ok())
            .unwrap_or_else(|| self.base_url.clone());
        let parsed = html::parse(&snapshot.html, &document_url, &self.base_url);
        let title = match snapshot.title.trim() {
            "" => html::extract_title(&snapshot.html).unwrap_or_default(),
            title => title.to_string(),
        };

        ::log::debug!(
            "Processed {} in {:.2} seconds",
            url,
            worker_start.elapsed().as_secs_f64()
        );

        Ok(PageRecord {
            url: url.to_string(),
            title,
            description: html::extract_description(&snapshot.html),
            content: parsed.content,
            page_type: classify(url),
            links: parsed.links,
            html: snapshot.html,
        })
    }
}

/// Crawl one site through WebDriver
pub async fn crawl_site(config: CrawlerConfig) -> Result<Vec<PageRecord>, CrawlError> {
    SiteCrawler::new(config)?.crawl().await
}

/// Crawl several sites, at most `max_concurrency` at a time.
///
/// Each site gets its own browser session and crawl state. Results are
/// returned in the order of `configs`.
pub async fn crawl_sites(
    configs: Vec<CrawlerConfig>,
    max_concurrency: usize,
) -> Vec<Result<Vec<PageRecord>, CrawlError>> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

    let handles: Vec<JoinHandle<Result<Vec<PageRecord>, CrawlError>>> = configs
        .into_iter()
        .map(|config| {
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| CrawlError::TaskFailed(format!("crawl scheduler closed: {e}")))?;
                crawl_site(config).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(task_outcome(handle.await));
    }
    results
}

/// Result of a crawl task, with panics and cancellation reported as failures
pub(crate) fn task_outcome(
    joined: Result<Result<Vec<PageRecord>, CrawlError>, JoinError>,
) -> Result<Vec<PageRecord>, CrawlError> {
    joined.unwrap_or_else(|e| {
        ::log::error!("Crawl task failed: {}", e);
        Err(CrawlError::TaskFailed(e.to_string()))
    })
}
