use clap::Parser;
use site_crawler::CrawlerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-crawler")]
#[command(about = "Crawls competitor websites and prints their classified pages")]
#[command(version)]
pub struct Args {
    /// Site URLs to crawl (scheme optional)
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// JSON configuration file; command-line flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum pages to fetch per site
    #[arg(short = 'n', long)]
    pub max_pages: Option<usize>,

    /// Per-page navigation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Wait after navigation before capturing content, in milliseconds
    #[arg(long)]
    pub settle_delay_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// WebDriver endpoint
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Number of sites crawled at the same time
    #[arg(short, long, default_value_t = 1)]
    pub concurrency: usize,

    /// Allow crawling localhost and private network addresses
    #[arg(long)]
    pub allow_private: bool,

    /// Print pages as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Include the rendered markup in JSON output
    #[arg(long, requires = "json")]
    pub include_html: bool,
}

impl Args {
    /// Build one crawl configuration per URL.
    ///
    /// Precedence: command-line flags, then environment, then the config file.
    pub fn crawler_configs(
        &self,
        base: Option<&CrawlerConfig>,
    ) -> Vec<CrawlerConfig> {
        self.urls
            .iter()
            .map(|url| {
                let mut config = match base {
                    Some(base) => CrawlerConfig {
                        start_url: url.clone(),
                        ..base.clone()
                    },
                    None => CrawlerConfig::new(url),
                };
                config.apply_env_overrides();
                self.apply_flags(&mut config);
                config
            })
            .collect()
    }

    fn apply_flags(&self, config: &mut CrawlerConfig) {
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(settle_delay_ms) = self.settle_delay_ms {
            config.settle_delay_ms = settle_delay_ms;
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if self.allow_private {
            config.allow_private_hosts = true;
        }
    }
}
