//! Shared types used across po-harvest modules
//!
//! Contains the purchase-order entities produced during one extraction pass.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Format used for the `Time` column of exported records
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A purchase order found on the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoReference {
    /// Absolute URL of the PO detail view
    pub url: String,
    /// PO number as shown in the listing
    pub po_number: String,
    /// Creation instant parsed from the listing
    pub created_at: NaiveDateTime,
}

/// Header fields of a PO detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoHeader {
    pub po_number: String,
    pub warehouse: String,
    pub vendor: String,
    pub total_qty: String,
}

/// One product row of a PO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_name: String,
    pub sku: String,
    pub ordered_qty: String,
}

/// Everything extracted from one detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoDetail {
    pub header: PoHeader,
    pub items: Vec<LineItem>,
}

/// Flattened export row: one per line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoRecord {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "PO Number")]
    pub po_number: String,
    #[serde(rename = "Warehouse")]
    pub warehouse: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Total Qty")]
    pub total_qty: String,
    #[serde(rename = "Name")]
    pub product_name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Ordered Qty")]
    pub ordered_qty: String,
    #[serde(rename = "PO URL")]
    pub po_url: String,
}

impl PoDetail {
    /// Flatten header x items into export records.
    ///
    /// A PO without line items yields no records.
    pub fn into_records(self, po_url: &str, extracted_at: NaiveDateTime) -> Vec<PoRecord> {
        let time = extracted_at.format(RECORD_TIME_FORMAT).to_string();
        let header = self.header;

        self.items
            .into_iter()
            .map(|item| PoRecord {
                time: time.clone(),
                po_number: header.po_number.clone(),
                warehouse: header.warehouse.clone(),
                vendor: header.vendor.clone(),
                total_qty: header.total_qty.clone(),
                product_name: item.product_name,
                sku: item.sku,
                ordered_qty: item.ordered_qty,
                po_url: po_url.to_string(),
            })
            .collect()
    }
}

/// Outcome of a completed extraction pass
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    /// Instant the pass started; becomes the new cursor
    pub started_at: Option<NaiveDateTime>,
    /// Cursor the listing was filtered against
    pub previous_cursor: Option<NaiveDateTime>,
    /// References selected from the listing
    pub selected: usize,
    /// Detail views extracted successfully
    pub extracted: usize,
    /// Listing rows skipped (bad date or unreadable cells)
    pub skipped_rows: usize,
    /// Detail views skipped after an error
    pub skipped_pos: usize,
    /// Where the CSV was written, if any records were found
    pub export_path: Option<PathBuf>,
    /// The exported records
    pub records: Vec<PoRecord>,
}

impl PassSummary {
    /// Whether anything was skipped along the way
    pub fn has_skips(&self) -> bool {
        self.skipped_rows > 0 || self.skipped_pos > 0
    }

    /// One-line description for the operator
    pub fn status_line(&self) -> String {
        format!(
            "{} new POs, {} extracted, {} records, {} rows skipped, {} POs skipped",
            self.selected,
            self.extracted,
            self.records.len(),
            self.skipped_rows,
            self.skipped_pos
        )
    }
}
