use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Semantic role of a page, derived from its URL path only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Home,
    Pricing,
    Blog,
    About,
    Features,
    Events,
    Contact,
    Careers,
    General,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::Pricing => "pricing",
            PageType::Blog => "blog",
            PageType::About => "about",
            PageType::Features => "features",
            PageType::Events => "events",
            PageType::Contact => "contact",
            PageType::Careers => "careers",
            PageType::General => "general",
        }
    }

    /// Page types the crawler fetches ahead of everything else
    pub fn is_priority(&self) -> bool {
        matches!(
            self,
            PageType::Pricing
                | PageType::Features
                | PageType::About
                | PageType::Blog
                | PageType::Events
        )
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Order matters: first match wins.
const PAGE_TYPE_PATTERNS: &[(PageType, &[&str])] = &[
    (PageType::Pricing, &["/pricing", "/plans", "/packages"]),
    (
        PageType::Blog,
        &["/blog", "/news", "/articles", "/posts", "/insights"],
    ),
    (PageType::About, &["/about", "/team", "/company", "/our-story"]),
    (
        PageType::Features,
        &["/features", "/product", "/solutions", "/capabilities"],
    ),
    (
        PageType::Events,
        &["/events", "/webinars", "/conferences", "/calendar"],
    ),
    (PageType::Contact, &["/contact", "/support", "/help"]),
    (PageType::Careers, &["/careers", "/jobs", "/hiring"]),
];

static PAGE_TYPE_TABLE: LazyLock<Vec<(PageType, Vec<Regex>)>> = LazyLock::new(|| {
    PAGE_TYPE_PATTERNS
        .iter()
        .map(|(page_type, patterns)| {
            let regexes = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("page type pattern is valid"))
                .collect();
            (*page_type, regexes)
        })
        .collect()
});

/// Classifies a URL by its path component.
///
/// Query string, fragment and host never influence the result. Inputs that
/// do not parse as absolute URLs are treated as a bare path.
pub fn classify(url: &str) -> PageType {
    let path = url_path(url);
    classify_path(&path)
}

/// Classifies an already-extracted path
pub fn classify_path(path: &str) -> PageType {
    for (page_type, regexes) in PAGE_TYPE_TABLE.iter() {
        if regexes.iter().any(|re| re.is_match(path)) {
            return *page_type;
        }
    }

    if path.is_empty() || path == "/" {
        PageType::Home
    } else {
        PageType::General
    }
}

fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_types() {
        assert_eq!(classify("https://example.com/pricing"), PageType::Pricing);
        assert_eq!(classify("https://example.com/blog/post-1"), PageType::Blog);
        assert_eq!(classify("https://example.com/about"), PageType::About);
        assert_eq!(classify("https://example.com/features"), PageType::Features);
        assert_eq!(classify("https://example.com/events"), PageType::Events);
        assert_eq!(classify("https://example.com/help/faq"), PageType::Contact);
        assert_eq!(classify("https://example.com/jobs/42"), PageType::Careers);
    }

    #[test]
    fn test_home_and_general() {
        assert_eq!(classify("https://x.com/"), PageType::Home);
        assert_eq!(classify("https://x.com"), PageType::Home);
        assert_eq!(classify("https://x.com/random-page"), PageType::General);
    }

    #[test]
    fn test_path_only() {
        let expected = PageType::Pricing;
        assert_eq!(classify("https://x.com/pricing"), expected);
        assert_eq!(classify("https://y.com/pricing?ref=1"), expected);
        assert_eq!(classify("https://x.com/PRICING"), expected);
        assert_eq!(classify("https://x.com/pricing#tiers"), expected);

        // Query strings that look like typed paths are ignored
        assert_eq!(classify("https://x.com/?next=/pricing"), PageType::Home);
        // So are hosts
        assert_eq!(classify("https://blog.x.com/"), PageType::Home);
    }

    #[test]
    fn test_first_match_wins() {
        // Both "product" (features) and "blog" appear; blog is earlier in the table
        assert_eq!(classify("https://x.com/product/blog"), PageType::Blog);
        // "/plans" beats "/company"
        assert_eq!(classify("https://x.com/company/plans"), PageType::Pricing);
        // Patterns are unanchored substrings of the path
        assert_eq!(classify("https://x.com/products/widget"), PageType::Features);
    }

    #[test]
    fn test_bare_paths() {
        assert_eq!(classify("/pricing"), PageType::Pricing);
        assert_eq!(classify("/careers?team=eng"), PageType::Careers);
        assert_eq!(classify(""), PageType::Home);
        assert_eq!(classify("/"), PageType::Home);
    }

    #[test]
    fn test_priority_types() {
        let priority: Vec<_> = [
            PageType::Home,
            PageType::Pricing,
            PageType::Blog,
            PageType::About,
            PageType::Features,
            PageType::Events,
            PageType::Contact,
            PageType::Careers,
            PageType::General,
        ]
        .into_iter()
        .filter(PageType::is_priority)
        .collect();

        assert_eq!(
            priority,
            vec![
                PageType::Pricing,
                PageType::Blog,
                PageType::About,
                PageType::Features,
                PageType::Events
            ]
        );
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&PageType::Pricing).unwrap();
        assert_eq!(json, "\"pricing\"");
        assert_eq!(PageType::General.to_string(), "general");
    }
}
