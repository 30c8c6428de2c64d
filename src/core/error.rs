//! Error types for po-harvest
//!
//! One error enum for the whole crate. Row-level failures (a bad date cell, a
//! detail page that times out) are contained by the scanner and the pass
//! runner; everything else ends the pass.

use thiserror::Error;

/// Main error type for extraction operations
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Browser driver reported a failure
    #[error("Browser error: {0}")]
    Browser(String),

    /// agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// An element did not reach the awaited state in time
    #[error("Timed out after {waited_ms}ms waiting for '{selector}'")]
    Timeout { selector: String, waited_ms: u128 },

    /// An element expected on the page is missing
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A date cell did not match the listing format
    #[error("Could not parse date '{input}': {source}")]
    DateParse {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Login flow failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Required credential variable is not set
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredentials(String),

    /// Listing could not be confirmed to be sorted newest first
    #[error("Listing sort order not verified after {attempts} attempts (last aria-sort: {last_seen:?})")]
    SortOrderUnverified {
        attempts: u32,
        last_seen: Option<String>,
    },

    /// A detail page did not have the expected structure
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Cursor store could not be read or written
    #[error("State error: {0}")]
    State(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an extraction error
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error only costs the row or PO it happened on.
    ///
    /// A page that fails to load, a wait that runs out, a missing element, a
    /// bad date or a malformed detail page is skipped. Anything else ends the
    /// pass.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            Self::Browser(_)
                | Self::Timeout { .. }
                | Self::ElementNotFound(_)
                | Self::DateParse { .. }
                | Self::Extraction(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_level_classification() {
        let timeout = ExtractError::Timeout {
            selector: ".po-order-items".to_string(),
            waited_ms: 30000,
        };
        assert!(timeout.is_row_level());
        assert!(ExtractError::extraction("no sku").is_row_level());
        assert!(ExtractError::browser("navigation failed").is_row_level());
        assert!(!ExtractError::AgentBrowserNotFound.is_row_level());
        assert!(!ExtractError::state("disk full").is_row_level());
        assert!(!ExtractError::auth("bad password").is_row_level());
        assert!(!ExtractError::SortOrderUnverified {
            attempts: 3,
            last_seen: Some("ascending".to_string()),
        }
        .is_row_level());
    }

    #[test]
    fn test_timeout_message_names_selector() {
        let err = ExtractError::Timeout {
            selector: "#your_orders".to_string(),
            waited_ms: 1500,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 1500ms waiting for '#your_orders'"
        );
    }
}
