use crate::config::CrawlerConfig;
use crate::error::{CrawlError, FetchError};
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::future::Future;
use std::time::Duration;

/// Extra time the client waits for the browser to report its own page load timeout
const NAVIGATION_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// Rendered state of the current page
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub html: String,
    pub title: String,
    /// URL of the loaded document, after redirects, if the renderer knows it
    pub url: Option<String>,
}

/// A browsing context that loads one page at a time.
///
/// The crawler calls `navigate`, then `settle`, then `snapshot` for each URL,
/// and `close` exactly once when the run ends.
pub trait Renderer: Send {
    /// Load `url`, failing if it takes longer than `timeout`.
    ///
    /// Returns the HTTP status when the browser exposes it. A timed-out
    /// navigation must not delay the next one.
    fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<u16>, FetchError>> + Send;

    /// Give client-side rendering time to finish
    fn settle(&mut self, delay: Duration) -> impl Future<Output = ()> + Send {
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Capture the rendered markup, title and URL of the current page
    fn snapshot(&mut self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;

    /// End the session
    fn close(self) -> impl Future<Output = Result<(), CrawlError>> + Send;
}

// Navigation Timing exposes the main document's status in Chromium and Firefox.
const STATUS_SCRIPT: &str = r#"
const entries = performance.getEntriesByType("navigation");
const nav = entries.length > 0 ? entries[0] : null;
return nav && typeof nav.responseStatus === "number" ? nav.responseStatus : null;
"#;

/// [`Renderer`] backed by a WebDriver session (ChromeDriver, geckodriver, ...)
///
/// WebDriver runs one command per session at a time, and a navigation the
/// client stops waiting for keeps running in the browser. The page load
/// timeout is therefore enforced by the browser itself, so an abandoned load
/// cannot hold up the commands for the next page.
pub struct WebDriverRenderer {
    client: Client,
    page_load_timeout: Duration,
}

impl WebDriverRenderer {
    /// Start a browser session on the configured WebDriver endpoint
    pub async fn connect(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        ::log::debug!(
            "Connecting to WebDriver at {} (headless: {})",
            config.webdriver_url,
            config.headless
        );

        let client = ClientBuilder::native()
            .capabilities(browser_capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| {
                ::log::error!(
                    "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
                );
                CrawlError::SessionStart {
                    endpoint: config.webdriver_url.clone(),
                    reason: e.to_string(),
                }
            })?;

        let mut renderer = Self {
            client,
            page_load_timeout: config.timeout(),
        };
        if let Err(e) = renderer.set_page_load_timeout(config.timeout()).await {
            let reason = e.to_string();
            if let Err(close_err) = renderer.client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", close_err);
            }
            return Err(CrawlError::SessionStart {
                endpoint: config.webdriver_url.clone(),
                reason: format!("could not set page load timeout: {reason}"),
            });
        }

        ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
        Ok(renderer)
    }

    async fn set_page_load_timeout(&mut self, timeout: Duration) -> Result<(), CmdError> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(timeout), None))
            .await?;
        self.page_load_timeout = timeout;
        Ok(())
    }

    async fn response_status(&self) -> Option<u16> {
        match self.client.execute(STATUS_SCRIPT, Vec::new()).await {
            Ok(value) => status_from_value(&value),
            Err(e) => {
                ::log::debug!("Could not read navigation status: {}", e);
                None
            }
        }
    }
}

impl Renderer for WebDriverRenderer {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<Option<u16>, FetchError> {
        if timeout != self.page_load_timeout {
            self.set_page_load_timeout(timeout)
                .await
                .map_err(|e| classify_cmd_error(e, timeout))?;
        }

        // The browser gives up at `timeout`; this only guards against a driver
        // that never answers.
        match tokio::time::timeout(timeout + NAVIGATION_TIMEOUT_MARGIN, self.client.goto(url)).await {
            Err(_) => Err(FetchError::Timeout(timeout)),
            Ok(Err(e)) => Err(classify_cmd_error(e, timeout)),
            Ok(Ok(())) => Ok(self.response_status().await),
        }
    }

    async fn snapshot(&mut self) -> Result<Snapshot, FetchError> {
        let timeout = self.page_load_timeout;
        let html = self
            .client
            .source()
            .await
            .map_err(|e| classify_cmd_error(e, timeout))?;
        let title = self
            .client
            .title()
            .await
            .map_err(|e| classify_cmd_error(e, timeout))?;
        let url = match self.client.current_url().await {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                ::log::debug!("Could not read current URL: {}", e);
                None
            }
        };
        Ok(Snapshot { html, title, url })
    }

    async fn close(self) -> Result<(), CrawlError> {
        self.client
            .close()
            .await
            .map_err(|e| CrawlError::SessionLost(e.to_string()))
    }
}

/// Capabilities for Chrome and Firefox; each driver ignores the other's block
pub fn browser_capabilities(config: &CrawlerConfig) -> Map<String, Value> {
    let mut chrome_args = vec![format!("--user-agent={}", config.user_agent)];
    let mut firefox_args = Vec::new();
    if config.headless {
        chrome_args.push("--headless=new".to_string());
        chrome_args.push("--disable-gpu".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut caps = Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({
            "args": firefox_args,
            "prefs": { "general.useragent.override": config.user_agent },
        }),
    );
    caps
}

/// A status of 0 or a missing value means the browser did not report one
fn status_from_value(value: &Value) -> Option<u16> {
    value
        .as_u64()
        .filter(|status| *status > 0)
        .and_then(|status| u16::try_from(status).ok())
}

fn classify_cmd_error(error: CmdError, timeout: Duration) -> FetchError {
    let lost = matches!(error, CmdError::Lost(_));
    classify_failure(error.to_string(), lost, timeout)
}

/// Maps a WebDriver failure message onto the crawl's per-page error kinds
fn classify_failure(message: String, connection_lost: bool, timeout: Duration) -> FetchError {
    let lowered = message.to_ascii_lowercase();
    let session_gone = connection_lost
        || lowered.contains("invalid session id")
        || lowered.contains("unable to find session")
        || lowered.contains("session deleted");

    if session_gone {
        FetchError::SessionLost(message)
    } else if lowered.contains("timeout") || lowered.contains("timed out") {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Transport(message)
    }
}
