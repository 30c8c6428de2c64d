//! Purchase-order listing scanner
//!
//! Finds the POs created since the last successful run. The listing is
//! sorted newest first, so the first row that is not newer than the cursor
//! ends the scan.

use chrono::NaiveDateTime;
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::browser::{wait_for, wait_until_hidden, BrowserSession};
use crate::core::{Config, ExtractError, PoReference, Result};
use crate::portal::{
    css, element_text, CREATED_DATE_HEADER, LISTING_BODY, LISTING_PROCESSING, LISTING_TABLE,
};

const DESCENDING: &str = "descending";
const EMPTY_TABLE_CLASS: &str = "dataTables_empty";

// 1-based cell positions in a listing row
const PO_NUMBER_CELL: usize = 3;
const CREATED_DATE_CELL: usize = 5;

/// Cells of interest from one listing row, as rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    pub po_number: Option<String>,
    pub created: Option<String>,
    pub href: Option<String>,
}

/// References selected by a scan plus the rows that had to be skipped
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub references: Vec<PoReference>,
    pub skipped_rows: usize,
    /// A row at or before the cursor was seen, so nothing newer lies below
    pub reached_cursor: bool,
}

/// Walks the listing page of an authenticated session
pub struct ListingScanner<'a> {
    session: &'a dyn BrowserSession,
    config: &'a Config,
}

impl<'a> ListingScanner<'a> {
    pub fn new(session: &'a dyn BrowserSession, config: &'a Config) -> Self {
        Self { session, config }
    }

    /// Load the listing and select every PO created after `last_run`.
    ///
    /// Load failures and an unverifiable sort order end the scan with an
    /// error; bad rows are skipped and counted.
    pub async fn scan(&self, last_run: Option<NaiveDateTime>) -> Result<ScanOutcome> {
        let timeouts = &self.config.timeouts;

        info!("Loading purchase-order listing");
        self.session.open(&self.config.listing_url()?).await?;
        wait_for(self.session, LISTING_TABLE, timeouts.page()).await?;
        wait_until_hidden(self.session, LISTING_PROCESSING, timeouts.page()).await?;

        self.ensure_descending().await?;
        wait_until_hidden(self.session, LISTING_PROCESSING, timeouts.page()).await?;

        match last_run {
            Some(cursor) => info!(%cursor, "Selecting POs created after last run"),
            None => info!("No previous run found, selecting every PO"),
        }

        let body = self.session.html(LISTING_BODY).await?;
        let rows = parse_listing_rows(&body)?;
        debug!(rows = rows.len(), "Listing rows loaded");

        let outcome = select_new(&rows, last_run, self.config);
        if last_run.is_some() && !outcome.reached_cursor && !outcome.references.is_empty() {
            // Only the first listing page is read
            warn!(
                selected = outcome.references.len(),
                "Every listed PO is newer than the last run; older new POs may be on later pages"
            );
        }
        info!(
            selected = outcome.references.len(),
            skipped = outcome.skipped_rows,
            "Listing scan finished"
        );
        Ok(outcome)
    }

    /// Click the Created Date header until the listing reports newest first.
    ///
    /// Returns the number of clicks it took.
    async fn ensure_descending(&self) -> Result<u32> {
        let timeouts = &self.config.timeouts;
        let max_attempts = self.config.scan.max_sort_attempts;

        wait_for(self.session, CREATED_DATE_HEADER, timeouts.short()).await?;

        let mut clicks = 0;
        loop {
            let sort = self
                .session
                .attribute(CREATED_DATE_HEADER, "aria-sort")
                .await?;

            if sort.as_deref() == Some(DESCENDING) {
                debug!(clicks, "Listing sorted newest first");
                return Ok(clicks);
            }

            if clicks >= max_attempts {
                return Err(ExtractError::SortOrderUnverified {
                    attempts: clicks,
                    last_seen: sort,
                });
            }

            debug!(current = ?sort, "Changing listing sort order");
            self.session.click(CREATED_DATE_HEADER).await?;
            clicks += 1;
            wait_until_hidden(self.session, LISTING_PROCESSING, timeouts.page()).await?;
        }
    }
}

/// Parse the inner HTML of the listing `<tbody>`
pub fn parse_listing_rows(body_html: &str) -> Result<Vec<ListingRow>> {
    let document = Html::parse_fragment(&format!("<table><tbody>{}</tbody></table>", body_html));
    let row_sel = css("tbody > tr")?;
    let cell_sel = css("td")?;
    let link_sel = css(".btn-info")?;

    let rows = document
        .select(&row_sel)
        .filter_map(|row| {
            let cells: Vec<_> = row.select(&cell_sel).collect();
            if is_empty_placeholder(&cells) {
                return None;
            }
            let cell_text = |n: usize| cells.get(n - 1).map(|c| element_text(*c));

            Some(ListingRow {
                po_number: cell_text(PO_NUMBER_CELL).filter(|t| !t.is_empty()),
                created: cell_text(CREATED_DATE_CELL),
                href: row
                    .select(&link_sel)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string),
            })
        })
        .collect();

    Ok(rows)
}

/// The single "No data available" cell DataTables renders for an empty table
fn is_empty_placeholder(cells: &[ElementRef<'_>]) -> bool {
    matches!(cells, [only] if only.value().classes().any(|class| class == EMPTY_TABLE_CLASS))
}

/// Parse a Created Date cell
pub fn parse_created(text: &str, format: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), format).map_err(|source| ExtractError::DateParse {
        input: text.to_string(),
        source,
    })
}

/// Take rows from the top while they are newer than `last_run`.
///
/// Unparseable or incomplete rows are skipped without ending the scan.
pub fn select_new(rows: &[ListingRow], last_run: Option<NaiveDateTime>, config: &Config) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        match select_row(row, last_run, config) {
            Ok(Some(reference)) => {
                info!(po = %reference.po_number, created = %reference.created_at, "Found new PO");
                outcome.references.push(reference);
            }
            Ok(None) => {
                debug!(row = index, "Reached a PO older than the last run");
                outcome.reached_cursor = true;
                break;
            }
            Err(e) => {
                warn!(row = index, error = %e, "Skipping listing row");
                outcome.skipped_rows += 1;
            }
        }
    }

    outcome
}

/// `Ok(None)` marks the first row that is not newer than the cursor
fn select_row(
    row: &ListingRow,
    last_run: Option<NaiveDateTime>,
    config: &Config,
) -> Result<Option<PoReference>> {
    let created_text = row
        .created
        .as_deref()
        .ok_or_else(|| ExtractError::ElementNotFound("Created Date cell".to_string()))?;
    let created_at = parse_created(created_text, &config.scan.date_format)?;

    if last_run.is_some_and(|cursor| created_at <= cursor) {
        return Ok(None);
    }

    let href = row
        .href
        .as_deref()
        .ok_or_else(|| ExtractError::ElementNotFound("PO detail link".to_string()))?;
    let po_number = row
        .po_number
        .clone()
        .ok_or_else(|| ExtractError::ElementNotFound("PO Number cell".to_string()))?;

    Ok(Some(PoReference {
        url: config.resolve(href)?,
        po_number,
        created_at,
    }))
}
