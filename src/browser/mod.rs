//! Browser automation module
//!
//! The session trait, its agent-browser implementation, and bounded waits.

mod executor;
mod session;
pub mod wait;

pub use executor::AgentBrowser;
pub use session::BrowserSession;
pub use wait::{wait_for, wait_until_hidden};
