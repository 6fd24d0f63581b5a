pub mod html;

#[cfg(test)]
mod tests;

pub use html::{extract_description, extract_links, extract_text, extract_title};

/// Result of parsing a rendered page
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Extracted text content
    pub content: String,
    /// Canonical same-site links
    pub links: Vec<String>,
}

impl ParseResult {
    /// Creates a new parse result with the given content and links
    pub fn new(content: String, links: Vec<String>) -> Self {
        Self { content, links }
    }
}
