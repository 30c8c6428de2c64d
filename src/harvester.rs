//! Harvester - wires configuration, cursor storage and the browser together
//!
//! Each `run` acquires a fresh agent-browser session, hands it to a
//! `PassRunner`, and lets the runner release it.

use chrono::NaiveDateTime;

use crate::browser::AgentBrowser;
use crate::core::{Config, Credentials, ExtractError, PassSummary, Result};
use crate::pass::PassRunner;
use crate::state::{CursorStore, FileCursorStore, MemoryCursorStore};

/// Entry point for extraction passes
pub struct Harvester {
    config: Config,
    store: Box<dyn CursorStore>,
}

impl Harvester {
    /// Harvester with the cursor persisted at `config.state.cursor_path`
    pub fn new(config: Config) -> Self {
        let store = FileCursorStore::new(config.state.cursor_path.clone());
        Self::with_store(config, Box::new(store))
    }

    /// Harvester whose cursor lives only as long as the process
    pub fn ephemeral(config: Config) -> Self {
        Self::with_store(config, Box::new(MemoryCursorStore::new()))
    }

    pub fn with_store(config: Config, store: Box<dyn CursorStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cursor of the last successful pass
    pub fn last_run(&self) -> Result<Option<NaiveDateTime>> {
        self.store.load()
    }

    /// Forget the cursor
    pub fn reset(&self) -> Result<()> {
        self.store.clear()
    }

    /// Run one full pass. `since` overrides the stored cursor for this pass only.
    pub async fn run(&self, since: Option<NaiveDateTime>) -> Result<PassSummary> {
        let credentials = Credentials::from_env()?;

        if !AgentBrowser::is_available(&self.config.browser.binary).await {
            return Err(ExtractError::AgentBrowserNotFound);
        }

        let session = AgentBrowser::from_config(&self.config.browser);
        PassRunner::new(&session, self.store.as_ref(), &self.config, &credentials)
            .with_since(since)
            .run()
            .await
    }
}
