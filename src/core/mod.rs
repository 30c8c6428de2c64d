//! Core module - shared infrastructure for po-harvest
//!
//! This module contains the purchase-order types, configuration, and error
//! handling used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, Credentials};
pub use error::{ExtractError, Result};
pub use types::*;
