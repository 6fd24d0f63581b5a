use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Returns the canonical form of a URL: no query, no fragment, no trailing slash.
///
/// Canonical strings are the identity used for the visited set and the frontier.
pub fn canonicalize(url: &Url) -> String {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    strip_trailing_slash(clean.as_str()).to_string()
}

/// Canonicalizes a URL string, or just trims trailing slashes if it does not parse
pub fn canonicalize_str(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => canonicalize(&parsed),
        Err(_) => strip_trailing_slash(url).to_string(),
    }
}

fn strip_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Host plus explicit port, compared exactly; subdomains are different sites
pub fn site_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Configuration for link filtering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Regex patterns a link must match (if empty, every same-site link is included)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for links to drop (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Decides which discovered links may enter the frontier
#[derive(Debug)]
pub struct UrlFilter {
    site: Option<String>,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl UrlFilter {
    /// Create a filter scoped to the site of `base_url`
    pub fn new(base_url: &Url, config: &UrlFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            site: site_key(base_url),
            include_regexes,
            exclude_regexes,
        })
    }

    /// Whether a URL belongs to the crawled site
    pub fn is_same_site(&self, url: &Url) -> bool {
        match (&self.site, site_key(url)) {
            (Some(site), Some(candidate)) => *site == candidate,
            _ => false,
        }
    }

    /// Determine if a link should be queued for crawling
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_same_site(url) {
            return false;
        }

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|re| re.is_match(url_str))
    }

    /// String form of [`UrlFilter::should_crawl`]; unparseable links are rejected
    pub fn should_crawl_str(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.should_crawl(&parsed),
            Err(_) => false,
        }
    }
}
