//! ShipHero dashboard pages
//!
//! Login, the purchase-order listing and the per-PO detail view. Page
//! structure lives in the selector constants below; the HTML helpers turn
//! fragments fetched from the session into plain text the same way the
//! browser renders it.

pub mod detail;
pub mod listing;
pub mod login;

pub use detail::DetailExtractor;
pub use listing::{ListingScanner, ScanOutcome};
pub use login::login;

use scraper::{ElementRef, Node, Selector};

use crate::core::{ExtractError, Result};

// Login form
pub const USERNAME_INPUT: &str = "#username";
pub const PASSWORD_INPUT: &str = "#password";
pub const CONTINUE_BUTTON: &str = "button:text-is(\"Continue\")";
pub const DASHBOARD_MARKER: &str = "#your_orders_info";

// Listing
pub const LISTING_TABLE: &str = "#your_orders";
pub const LISTING_BODY: &str = "#your_orders tbody";
pub const LISTING_PROCESSING: &str = "#your_orders_processing";
pub const CREATED_DATE_HEADER: &str = "th:has-text(\"Created Date\")";

// Detail view
pub const ITEMS_TABLE: &str = ".po-order-items";
pub const ITEMS_BODY: &str = "table.po-order-items tbody";
pub const PO_NUMBER_INPUT: &str = "input[name=\"po_number\"]";
pub const DETAIL_ROOT: &str = "body";

/// Selector for the quantity input of the `row`-th item (1-based)
pub fn qty_input_selector(row: usize) -> String {
    format!("{} > tr:nth-child({}) input.qty_input", ITEMS_BODY, row)
}

/// Compile a CSS selector known at build time
pub(crate) fn css(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ExtractError::Other(format!("Invalid selector '{}': {:?}", selector, e)))
}

/// Text content with whitespace runs collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text content split into rendered lines (`<br>` and block elements break)
pub(crate) fn element_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = vec![String::new()];

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                if let Some(current) = lines.last_mut() {
                    current.push_str(text);
                }
            }
            Node::Element(el) if matches!(el.name(), "br" | "div" | "p" | "li") => {
                lines.push(String::new());
            }
            _ => {}
        }
    }

    lines
        .into_iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Replace the CSV field delimiter in scraped text
pub fn sanitize(text: &str) -> String {
    text.replace(',', " ")
}
