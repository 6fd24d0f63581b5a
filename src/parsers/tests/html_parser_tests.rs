use crate::parsers::html::{extract_description, extract_links, extract_text, extract_title};
use url::Url;

fn example() -> Url {
    Url::parse("https://example.com").unwrap()
}

#[cfg(test)]
mod text_tests {
    use super::*;

    #[test]
    fn test_removed_tags_never_leak() {
        let html = "<script>var x=1;</script><nav>Nav</nav><main><p>Hello</p></main><footer>F</footer>";
        let text = extract_text(html);
        assert!(text.contains("Hello"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("Nav"));
        assert!(!text.contains('F'));
    }

    #[test]
    fn test_full_document() {
        let html = r#"
        <html>
          <head><title>Acme</title><style>body { color: red; }</style></head>
          <body>
            <header><a href="/">Acme Inc</a></header>
            <script>var x = 1;</script>
            <nav>Nav content</nav>
            <main>
              <p>Hello World</p>
              <p>Another paragraph</p>
              <svg><text>Chart label</text></svg>
              <noscript>Enable JavaScript</noscript>
            </main>
            <footer>Footer</footer>
          </body>
        </html>
        "#;
        let text = extract_text(html);
        assert_eq!(text, "Hello World\nAnother paragraph");
    }

    #[test]
    fn test_one_line_per_text_node() {
        let html = "<body><h1>  Plans  </h1><ul><li>Starter</li><li>Pro</li></ul>\n\n<p>\n  Billed\n  yearly\n</p></body>";
        assert_eq!(extract_text(html), "Plans\nStarter\nPro\nBilled\nyearly");
    }

    #[test]
    fn test_inline_elements_split_lines() {
        let html = "<p>Save <strong>20%</strong> today</p>";
        assert_eq!(extract_text(html), "Save\n20%\ntoday");
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("<html><body>   \n\t </body></html>"), "");
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let html = "<div><p>Unclosed <b>bold<div>Still here</p></span><script>bad(";
        let text = extract_text(html);
        assert!(text.contains("Unclosed"));
        assert!(text.contains("Still here"));
        assert!(!text.contains("bad("));
    }
}

#[cfg(test)]
mod link_tests {
    use super::*;

    #[test]
    fn test_same_domain_only() {
        let html = r#"
        <html><body>
        <a href="/about">About</a>
        <a href="https://example.com/pricing">Pricing</a>
        <a href="https://other.com/page">External</a>
        <a href="https://blog.example.com/post">Subdomain</a>
        </body></html>
        "#;
        let links = extract_links(html, &example());
        assert_eq!(
            links,
            vec![
                "https://example.com/about".to_string(),
                "https://example.com/pricing".to_string()
            ]
        );
    }

    #[test]
    fn test_canonicalizes_and_dedups() {
        let html = r##"
        <a href="/features/">Features</a>
        <a href="/features?utm=1">Features again</a>
        <a href="/features#top">Features top</a>
        <a href="https://example.com/features">Absolute</a>
        "##;
        let links = extract_links(html, &example());
        assert_eq!(links, vec!["https://example.com/features".to_string()]);
    }

    #[test]
    fn test_skips_non_http_links() {
        let html = r##"
        <a href="mailto:sales@example.com">Mail</a>
        <a href="tel:+15555550100">Call</a>
        <a href="javascript:void(0)">Menu</a>
        <a href="#">Top</a>
        <a>No href</a>
        "##;
        let links = extract_links(html, &example());
        // "#" resolves to the base page itself
        assert_eq!(links, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_relative_to_page() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let html = r#"<a href="post-1">Post</a><a href="../pricing">Pricing</a>"#;
        let links = extract_links(html, &base);
        assert_eq!(
            links,
            vec![
                "https://example.com/blog/post-1".to_string(),
                "https://example.com/pricing".to_string()
            ]
        );
    }

    #[test]
    fn test_links_inside_nav_are_kept() {
        let html = r#"<nav><a href="/pricing">Pricing</a></nav><footer><a href="/careers">Jobs</a></footer>"#;
        let links = extract_links(html, &example());
        assert_eq!(links.len(), 2);
    }
}

#[cfg(test)]
mod metadata_tests {
    use super::*;

    #[test]
    fn test_title() {
        let html = "<html><head><title>  Acme | Pricing </title></head><body><h1>Plans</h1></body></html>";
        assert_eq!(extract_title(html), Some("Acme | Pricing".to_string()));
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let html = "<html><head></head><body><h1>Our <em>Plans</em></h1></body></html>";
        assert_eq!(extract_title(html), Some("Our Plans".to_string()));
        assert_eq!(extract_title("<p>nothing</p>"), None);
    }

    #[test]
    fn test_description() {
        let html = r#"<head>
            <meta property="og:description" content="Open graph text">
            <meta name="description" content=" Plain description ">
        </head>"#;
        assert_eq!(
            extract_description(html),
            Some("Plain description".to_string())
        );

        let og_only = r#"<meta property="og:description" content="Open graph text">"#;
        assert_eq!(
            extract_description(og_only),
            Some("Open graph text".to_string())
        );

        assert_eq!(extract_description("<meta name=\"description\" content=\"\">"), None);
    }
}
