use crate::error::CrawlError;
use crate::filter::UrlFilterConfig;
use crate::safety::normalize_target;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration for a single-site crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// URL to start crawling from
    pub start_url: String,

    /// Maximum number of pages to fetch successfully
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Per-navigation timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Wait after navigation before capturing the page, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// User agent the browser presents
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Regex patterns for links to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for links to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Skip the checks that keep crawls off private and local hosts
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_max_pages() -> usize {
    20
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_settle_delay_ms() -> u64 {
    1_500
}

fn default_headless() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

impl CrawlerConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_pages: default_max_pages(),
            timeout_ms: default_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            headless: default_headless(),
            webdriver_url: default_webdriver_url(),
            user_agent: default_user_agent(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            allow_private_hosts: false,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrawlError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CrawlError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settle_delay_ms = settle_delay_ms;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_webdriver_url(mut self, webdriver_url: &str) -> Self {
        self.webdriver_url = webdriver_url.to_string();
        self
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source.
    ///
    /// Recognized keys: `WEBDRIVER_URL`, `SCRAPER_MAX_PAGES`, `SCRAPER_TIMEOUT_MS`,
    /// `SCRAPER_SETTLE_DELAY_MS`, `SCRAPER_HEADLESS`. Empty or unparseable values
    /// are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("WEBDRIVER_URL") {
            self.webdriver_url = url;
        }
        if let Some(value) = get("SCRAPER_MAX_PAGES") {
            override_parsed("SCRAPER_MAX_PAGES", &value, &mut self.max_pages);
        }
        if let Some(value) = get("SCRAPER_TIMEOUT_MS") {
            override_parsed("SCRAPER_TIMEOUT_MS", &value, &mut self.timeout_ms);
        }
        if let Some(value) = get("SCRAPER_SETTLE_DELAY_MS") {
            override_parsed("SCRAPER_SETTLE_DELAY_MS", &value, &mut self.settle_delay_ms);
        }
        if let Some(value) = get("SCRAPER_HEADLESS") {
            match parse_bool(&value) {
                Some(headless) => self.headless = headless,
                None => ::log::warn!("Ignoring SCRAPER_HEADLESS={value}: expected a boolean"),
            }
        }
    }

    /// Check the configuration before a crawl starts
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_pages == 0 {
            return Err(CrawlError::Config("max_pages must be at least 1".into()));
        }
        if self.timeout_ms == 0 {
            return Err(CrawlError::Config("timeout_ms must be at least 1".into()));
        }
        normalize_target(&self.start_url)?;
        Url::parse(&self.webdriver_url).map_err(|source| CrawlError::InvalidUrl {
            url: self.webdriver_url.clone(),
            source,
        })?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// The link filter section of this configuration
    pub fn url_filter_config(&self) -> UrlFilterConfig {
        UrlFilterConfig {
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

fn override_parsed<T: std::str::FromStr>(key: &str, value: &str, target: &mut T) {
    match value.trim().parse() {
        Ok(parsed) => *target = parsed,
        Err(_) => ::log::warn!("Ignoring {key}={value}: not a valid number"),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
