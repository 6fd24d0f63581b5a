use crate::classify::PageType;
use serde::{Deserialize, Serialize};

/// A page fetched during a crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Canonical URL of the page
    pub url: String,

    /// Title reported by the browser, or taken from the markup
    pub title: String,

    /// Meta description, if the page declares one
    pub description: Option<String>,

    /// Visible text, one line per text node
    pub content: String,

    /// Fully rendered markup
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub html: String,

    /// Classification of the URL path
    pub page_type: PageType,

    /// Canonical same-site links discovered on the page
    pub links: Vec<String>,
}

impl PageRecord {
    /// Returns a copy without the raw markup, for compact output
    pub fn without_html(&self) -> Self {
        Self {
            html: String::new(),
            ..self.clone()
        }
    }
}
