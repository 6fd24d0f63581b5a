use crate::filter::{canonicalize, site_key};
use crate::parsers::ParseResult;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Elements whose text never reaches the extracted content
const NON_CONTENT_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "nav", "footer", "header",
];

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));
static H1_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("h1 selector is valid"));
static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("meta selector is valid"));

/// Parses rendered HTML into visible text and same-site links.
///
/// Hrefs are resolved against `document_url`, the address the page was
/// actually served from; only links on the same site as `site_url` are kept.
pub fn parse(html: &str, document_url: &Url, site_url: &Url) -> ParseResult {
    let doc = Html::parse_document(html);
    ParseResult::new(
        text_of(&doc),
        links_of(&doc, document_url, site_key(site_url)),
    )
}

/// Extracts readable text, one trimmed line per visible text node.
///
/// Text inside scripts, styles, inline SVG, navigation, headers and footers
/// is dropped. Malformed markup is parsed leniently; whatever text survives
/// the parse is returned.
pub fn extract_text(html: &str) -> String {
    text_of(&Html::parse_document(html))
}

/// Extracts the canonical same-site links of a page, deduplicated, in document order.
///
/// Hrefs are resolved against `base_url`; a link is kept only when its host
/// (and port) match `base_url` exactly.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    links_of(&Html::parse_document(html), base_url, site_key(base_url))
}

/// Extracts the page title, falling back to the first `<h1>`
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    first_text(&doc, &TITLE_SELECTOR).or_else(|| first_text(&doc, &H1_SELECTOR))
}

/// Extracts the meta description, falling back to `og:description`
pub fn extract_description(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let mut og_description = None;

    for meta in doc.select(&META_SELECTOR) {
        let key = meta
            .value()
            .attr("name")
            .or_else(|| meta.value().attr("property"))
            .unwrap_or_default();
        let content = meta.value().attr("content").unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        if key.eq_ignore_ascii_case("description") {
            return Some(content.to_string());
        }
        if key.eq_ignore_ascii_case("og:description") && og_description.is_none() {
            og_description = Some(content.to_string());
        }
    }

    og_description
}

fn text_of(doc: &Html) -> String {
    let mut lines = Vec::new();

    for node in doc.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        // Text nodes may span several source lines
        lines.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    lines.join("\n")
}

fn links_of(doc: &Html, document_url: &Url, site: Option<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in doc.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = document_url.join(href.trim()) else {
            ::log::trace!("Skipping unresolvable href: {}", href);
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") || site_key(&resolved) != site {
            continue;
        }

        let canonical = canonicalize(&resolved);
        if seen.insert(canonical.clone()) {
            links.push(canonical);
        }
    }

    ::log::debug!("HTML parser found {} same-site links", links.len());
    links
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .map(|el| {
            el.text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .find(|text| !text.is_empty())
}
