use crate::classify::{PageType, classify};
use std::collections::{HashSet, VecDeque};

/// Crawl frontier with two levels of priority.
///
/// Links whose page type is worth spending budget on go to the priority
/// queue; everything else goes to the normal queue. `pop` drains the priority
/// queue first, each queue in FIFO order. A URL is queued at most once.
#[derive(Debug, Default)]
pub struct Frontier {
    priority: VecDeque<String>,
    normal: VecDeque<String>,
    queued: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frontier seeded with a single URL
    pub fn seeded(url: impl Into<String>) -> Self {
        let mut frontier = Self::new();
        frontier.push_back(url.into());
        frontier
    }

    /// Queue a canonical URL by its page type.
    ///
    /// Returns the assigned page type, or `None` if the URL was already queued.
    pub fn push(&mut self, url: String) -> Option<PageType> {
        if self.queued.contains(&url) {
            return None;
        }
        let page_type = classify(&url);
        self.queued.insert(url.clone());
        if page_type.is_priority() {
            self.priority.push_back(url);
        } else {
            self.normal.push_back(url);
        }
        Some(page_type)
    }

    /// Queue a URL at the back of the normal queue, regardless of type
    pub fn push_back(&mut self, url: String) -> bool {
        if !self.queued.insert(url.clone()) {
            return false;
        }
        self.normal.push_back(url);
        true
    }

    /// Take the next URL to fetch
    pub fn pop(&mut self) -> Option<String> {
        self.priority
            .pop_front()
            .or_else(|| self.normal.pop_front())
    }

    pub fn len(&self) -> usize {
        self.priority.len() + self.normal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_empty() && self.normal.is_empty()
    }
}
