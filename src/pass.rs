//! One extraction pass
//!
//! login -> listing scan -> detail extraction -> CSV export -> cursor update.
//! The session is closed whatever happens, and the cursor only moves after
//! everything before it succeeded.

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::core::{Config, Credentials, PassSummary, Result};
use crate::export;
use crate::portal::{login, DetailExtractor, ListingScanner};
use crate::state::CursorStore;

/// Runs a single pass over an already-acquired browser session
pub struct PassRunner<'a> {
    session: &'a dyn BrowserSession,
    store: &'a dyn CursorStore,
    config: &'a Config,
    credentials: &'a Credentials,
    since: Option<NaiveDateTime>,
}

impl<'a> PassRunner<'a> {
    pub fn new(
        session: &'a dyn BrowserSession,
        store: &'a dyn CursorStore,
        config: &'a Config,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            session,
            store,
            config,
            credentials,
            since: None,
        }
    }

    /// Filter the listing against `since` instead of the stored cursor
    pub fn with_since(mut self, since: Option<NaiveDateTime>) -> Self {
        self.since = since;
        self
    }

    /// Run the pass and release the session.
    ///
    /// On success the cursor is advanced to the instant the pass started, so
    /// POs created while it ran are picked up by the next one.
    pub async fn run(self) -> Result<PassSummary> {
        let started_at = Local::now().naive_local();
        info!(%started_at, "Starting extraction pass");

        let result = self.extract_and_export(started_at).await;

        if let Err(e) = self.session.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Extraction pass failed, cursor left unchanged");
                return Err(e);
            }
        };

        self.store.save(started_at)?;
        info!(cursor = %started_at, "{}", summary.status_line());
        Ok(summary)
    }

    async fn extract_and_export(&self, started_at: NaiveDateTime) -> Result<PassSummary> {
        let previous_cursor = match self.since {
            Some(since) => Some(since),
            None => self.store.load()?,
        };

        login(self.session, self.config, self.credentials).await?;

        let scan = ListingScanner::new(self.session, self.config)
            .scan(previous_cursor)
            .await?;

        let mut summary = PassSummary {
            started_at: Some(started_at),
            previous_cursor,
            selected: scan.references.len(),
            skipped_rows: scan.skipped_rows,
            ..Default::default()
        };

        let extractor = DetailExtractor::new(self.session, self.config);
        for reference in &scan.references {
            match extractor.extract(reference).await {
                Ok(detail) => {
                    summary.extracted += 1;
                    let extracted_at = Local::now().naive_local();
                    summary
                        .records
                        .extend(detail.into_records(&reference.url, extracted_at));
                }
                Err(e) if e.is_row_level() => {
                    warn!(po = %reference.po_number, url = %reference.url, error = %e, "Skipping PO");
                    summary.skipped_pos += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if summary.records.is_empty() {
            info!("No new PO lines to export");
        } else {
            let path = &self.config.export.output_path;
            export::write_csv(path, &summary.records)?;
            summary.export_path = Some(path.clone());
        }

        Ok(summary)
    }
}
