use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// An element to look for: a CSS selector, optionally narrowed to elements
/// whose visible text contains `text` (case and whitespace insensitive). The
/// first match is always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub css: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Target {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Whether an element with the given visible text satisfies the filter.
    pub fn text_matches(&self, element_text: &str) -> bool {
        match &self.text {
            Some(wanted) => normalize(element_text).contains(&normalize(wanted)),
            None => true,
        }
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{} (text \"{}\")", self.css, text),
            None => f.write_str(&self.css),
        }
    }
}

/// The single browser page a scrape run drives.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the document to load
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// Wait until `target` is present; `ScraperError::Timeout` otherwise
    async fn wait_for(&self, target: &Target, timeout: Duration) -> Result<(), ScraperError>;

    /// Replace the value of an input field
    async fn fill(&self, target: &Target, text: &str) -> Result<(), ScraperError>;

    /// Click the first element matching `target`
    async fn click(&self, target: &Target) -> Result<(), ScraperError>;

    /// Visible text of the first element matching `target`
    async fn inner_text(&self, target: &Target) -> Result<String, ScraperError>;

    /// Click an element inside the first frame whose URL contains `frame_src`
    async fn click_in_frame(
        &self,
        frame_src: &str,
        target: &Target,
        timeout: Duration,
    ) -> Result<(), ScraperError>;

    /// Current URL, if known
    async fn url(&self) -> Result<Option<String>, ScraperError>;

    /// Rendered HTML of the current document
    async fn content(&self) -> Result<String, ScraperError>;

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>, ScraperError>;

    /// Release the page and its browser
    async fn close(&mut self) -> Result<(), ScraperError>;
}
