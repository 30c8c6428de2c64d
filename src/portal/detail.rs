//! Purchase-order detail extraction
//!
//! Reads the header fields and every product row of one PO. Text fields are
//! stripped of commas here so the export never has to quote them.

use scraper::{ElementRef, Html};
use tracing::{debug, info};

use crate::browser::{wait_for, BrowserSession};
use crate::core::{Config, ExtractError, LineItem, PoDetail, PoHeader, PoReference, Result};
use crate::portal::{
    css, element_lines, element_text, qty_input_selector, sanitize, DETAIL_ROOT, ITEMS_TABLE,
    PO_NUMBER_INPUT,
};

const WAREHOUSE_LABEL: &str = "Warehouse";
const VENDOR_LABEL: &str = "Vendor:";
const TOTAL_QTY_LABEL: &str = "Total Quantity:";
const SKU_MARKER: &str = "Sku:";

/// Header fields located by label on the detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLabels {
    pub warehouse: String,
    pub vendor: String,
    pub total_qty: String,
}

/// Name and SKU of one product row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCells {
    pub product_name: String,
    pub sku: String,
}

/// Reads PO detail views through an authenticated session
pub struct DetailExtractor<'a> {
    session: &'a dyn BrowserSession,
    config: &'a Config,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(session: &'a dyn BrowserSession, config: &'a Config) -> Self {
        Self { session, config }
    }

    /// Load the detail view of `reference` and extract header and items.
    ///
    /// Any missing element fails the whole PO.
    pub async fn extract(&self, reference: &PoReference) -> Result<PoDetail> {
        debug!(url = %reference.url, "Loading PO detail");
        self.session.open(&reference.url).await?;
        wait_for(self.session, ITEMS_TABLE, self.config.timeouts.page()).await?;

        let po_number = self.session.value(PO_NUMBER_INPUT).await?;
        let page = self.session.html(DETAIL_ROOT).await?;
        let (labels, cells) = parse_detail_page(&page)?;

        info!(po = %po_number, vendor = %labels.vendor, items = cells.len(), "Extracting PO");

        let mut items = Vec::with_capacity(cells.len());
        for (index, cell) in cells.into_iter().enumerate() {
            let ordered_qty = self.session.value(&qty_input_selector(index + 1)).await?;
            items.push(LineItem {
                product_name: cell.product_name,
                sku: cell.sku,
                ordered_qty: ordered_qty.trim().to_string(),
            });
        }

        Ok(PoDetail {
            header: PoHeader {
                po_number: po_number.trim().to_string(),
                warehouse: labels.warehouse,
                vendor: labels.vendor,
                total_qty: labels.total_qty,
            },
            items,
        })
    }
}

/// Parse labelled header fields and item rows from the detail page HTML
pub fn parse_detail_page(page_html: &str) -> Result<(DetailLabels, Vec<ItemCells>)> {
    let document = Html::parse_document(page_html);

    let labels = DetailLabels {
        warehouse: sanitize(&labelled_value(&document, WAREHOUSE_LABEL)?),
        vendor: sanitize(&labelled_value(&document, VENDOR_LABEL)?),
        total_qty: labelled_value(&document, TOTAL_QTY_LABEL)?,
    };

    let row_sel = css("table.po-order-items tbody > tr")?;
    let items = document
        .select(&row_sel)
        .map(parse_item_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((labels, items))
}

/// Text of `<strong>` in the `<div>` following the label with exactly `label`
fn labelled_value(document: &Html, label: &str) -> Result<String> {
    let label_sel = css("label")?;
    let strong_sel = css("strong")?;

    document
        .select(&label_sel)
        .find(|el| element_text(*el) == label)
        .and_then(|el| {
            el.next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sib| sib.value().name() == "div")
        })
        .and_then(|div| div.select(&strong_sel).next())
        .map(element_text)
        .ok_or_else(|| ExtractError::extraction(format!("No value for label '{}'", label)))
}

fn parse_item_row(row: ElementRef<'_>) -> Result<ItemCells> {
    let product_cell_sel = css("td:nth-child(2)")?;
    let name_sel = css("a")?;

    let cell = row
        .select(&product_cell_sel)
        .next()
        .ok_or_else(|| ExtractError::extraction("Item row has no product cell"))?;
    let name = cell
        .select(&name_sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractError::extraction("Item row has no product link"))?;

    Ok(ItemCells {
        product_name: sanitize(&name),
        sku: sanitize(&parse_sku(&element_lines(cell))?),
    })
}

/// Pull the SKU out of the `Sku: ...` line of a product cell
pub fn parse_sku(lines: &[String]) -> Result<String> {
    lines
        .iter()
        .find(|line| line.contains(SKU_MARKER))
        .and_then(|line| line.split_once(SKU_MARKER))
        .map(|(_, sku)| sku.trim().to_string())
        .ok_or_else(|| ExtractError::extraction("Product cell has no Sku line"))
}
