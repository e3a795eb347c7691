use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Errors raised by the browser session
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to start WebDriver session: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out waiting for '{selector}' on {url}")]
    ReadyTimeout { url: String, selector: String },

    #[error("Failed to read page source of {url}: {reason}")]
    Source { url: String, reason: String },

    #[error("Failed to close browser session: {0}")]
    Close(String),
}

/// Errors raised while extracting a product record from a fragment
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("<{element}> element has no '{attribute}' attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },
}

/// Errors raised by the catalog store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalog {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by the scrape service to its caller
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No product data found or failed to scrape.")]
    NoProducts,

    #[error("An error occurred: {0}")]
    Internal(String),
}

impl From<RenderError> for ServiceError {
    fn from(e: RenderError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}
