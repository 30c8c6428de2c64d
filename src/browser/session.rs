//! Browser session abstraction
//!
//! Every portal step takes a `&dyn BrowserSession` so the scanner, the
//! extractor and the pass runner never own or look up a global driver.

use async_trait::async_trait;

use crate::core::Result;

/// One authenticated page driven by a browser.
///
/// Selectors are Playwright-style CSS selectors. Every call acts on the page
/// currently loaded by the last `open`.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to a URL
    async fn open(&self, url: &str) -> Result<()>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<()>;

    /// Replace the contents of an input
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Current value of an input-like element
    async fn value(&self, selector: &str) -> Result<String>;

    /// Attribute of an element, `None` when it is not set
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Inner HTML of an element
    async fn html(&self, selector: &str) -> Result<String>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Whether the first match is visible
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Release the browser
    async fn close(&self) -> Result<()>;
}
