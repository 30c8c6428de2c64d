//! po-harvest - incremental purchase-order extraction
//!
//! Drives the ShipHero dashboard through agent-browser, collects every
//! purchase order created since the last successful run, and exports one CSV
//! row per PO line item.
//!
//! # Architecture
//!
//! - **Core**: PO types, configuration, and error handling
//! - **Browser**: session trait, agent-browser driver, bounded waits
//! - **Portal**: login, listing scanner, detail extractor
//! - **State**: last-run cursor storage
//! - **Export**: CSV encoding and table rendering
//! - **Pass**: one login-to-export run with cursor advancement
//! - **CLI**: interactive prompt and commands
//!
//! # Usage
//!
//! ```rust,no_run
//! use po_harvest::{Config, Harvester};
//!
//! #[tokio::main]
//! async fn main() {
//!     let harvester = Harvester::new(Config::load());
//!     let summary = harvester.run(None).await.unwrap();
//!     println!("{}", summary.status_line());
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod core;
pub mod export;
pub mod harvester;
pub mod logging;
pub mod pass;
pub mod portal;
pub mod state;

// Re-export commonly used items
pub use cli::Repl;
pub use core::{Config, ExtractError, Result};
pub use harvester::Harvester;
pub use pass::PassRunner;
