use std::time::Duration;
use thiserror::Error;

/// Errors that stop a crawl run
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Refusing to crawl {url}: {reason}")]
    UnsafeTarget { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start renderer session at {endpoint}: {reason}")]
    SessionStart { endpoint: String, reason: String },

    #[error("Renderer session lost: {0}")]
    SessionLost(String),

    /// The crawl task panicked or was cancelled before producing a result
    #[error("Crawl task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors for a single page fetch
///
/// Everything except [`FetchError::SessionLost`] is recovered by the crawler:
/// the URL yields no page and the crawl moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("session lost: {0}")]
    SessionLost(String),
}

impl FetchError {
    /// Whether this failure means the renderer session itself is gone
    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::SessionLost(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_loss_is_fatal() {
        assert!(FetchError::SessionLost("gone".into()).is_fatal());
        assert!(!FetchError::Timeout(Duration::from_secs(1)).is_fatal());
        assert!(!FetchError::HttpStatus(404).is_fatal());
        assert!(!FetchError::Transport("refused".into()).is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = FetchError::HttpStatus(503);
        assert_eq!(err.to_string(), "HTTP status 503");

        let err = CrawlError::UnsafeTarget {
            url: "http://localhost".into(),
            reason: "private/local hostnames are not allowed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Refusing to crawl http://localhost: private/local hostnames are not allowed"
        );
    }
}
