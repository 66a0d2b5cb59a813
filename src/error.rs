use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("browser initialization error: {0}")]
    BrowserInit(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("javascript error: {0}")]
    JavaScript(String),

    #[error("screenshot error: {0}")]
    Screenshot(String),

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("phase order violated: expected {expected}, found {found}")]
    PhaseOrder { expected: String, found: String },

    #[error("file error: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

impl ScraperError {
    /// True for failures caused by an element that never showed up.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ElementNotFound(_))
    }
}
