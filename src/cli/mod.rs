//! CLI module - command-line interface
//!
//! Contains the interactive prompt and command parsing.

pub mod commands;
pub mod repl;

pub use repl::Repl;
