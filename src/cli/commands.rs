//! CLI commands
//!
//! Commands understood by the interactive prompt, plus the report printed
//! after a pass (shared with the one-shot `run` subcommand).

use chrono::NaiveDateTime;

use crate::core::{PassSummary, Result};
use crate::export::render_table;
use crate::harvester::Harvester;

/// Result of parsing a command
pub enum CommandResult {
    /// Command was handled, show output
    Handled(String),
    /// Run an extraction pass, optionally from an explicit instant
    Run(Option<NaiveDateTime>),
    /// Exit the prompt
    Exit,
    /// No output needed
    None,
}

/// Format accepted for explicit `since` instants
pub const SINCE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse an operator-supplied `since` instant (`YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM:SS`)
pub fn parse_since(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, SINCE_FORMAT)
        .or_else(|_| text.parse::<NaiveDateTime>())
        .ok()
}

/// Parse and handle prompt commands
pub fn handle_command(input: &str, harvester: &Harvester) -> Result<CommandResult> {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0].trim_start_matches('/').to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd.as_str() {
        "" => Ok(CommandResult::None),

        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "run" | "go" => {
            if args.is_empty() {
                return Ok(CommandResult::Run(None));
            }
            match parse_since(args) {
                Some(since) => Ok(CommandResult::Run(Some(since))),
                None => Ok(CommandResult::Handled(format!(
                    "Could not read '{}'. Usage: run [YYYY-MM-DD HH:MM]",
                    args
                ))),
            }
        }

        "status" => Ok(CommandResult::Handled(status_text(harvester)?)),

        "reset" => {
            harvester.reset()?;
            Ok(CommandResult::Handled(
                "Cursor cleared. The next run extracts every PO in the listing.".to_string(),
            ))
        }

        "config" => Ok(CommandResult::Handled(harvester.config().to_toml())),

        _ => Ok(CommandResult::Handled(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            cmd
        ))),
    }
}

/// Describe the stored cursor and where output goes
pub fn status_text(harvester: &Harvester) -> Result<String> {
    let config = harvester.config();
    let cursor = match harvester.last_run()? {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "never (next run extracts everything)".to_string(),
    };

    Ok(format!(
        "po-harvest status:\n\
         ─────────────────────────────\n\
         Portal:    {}\n\
         Last run:  {}\n\
         Cursor:    {}\n\
         Output:    {}\n\
         Browser:   {} ({})",
        config.portal.base_url,
        cursor,
        config.state.cursor_path.display(),
        config.export.output_path.display(),
        config.browser.session_name,
        if config.browser.headed { "headed" } else { "headless" }
    ))
}

/// Report shown to the operator after a successful pass
pub fn pass_report(summary: &PassSummary) -> String {
    let mut output = String::new();

    if summary.records.is_empty() {
        output.push_str("No new purchase orders since the last run.\n");
    } else {
        output.push_str("Recent PO Details\n\n");
        output.push_str(&render_table(&summary.records));
        output.push('\n');
    }

    output.push_str(&format!("Successfully extracted recent PO details: {}\n", summary.status_line()));

    if let Some(path) = &summary.export_path {
        output.push_str(&format!("CSV saved to {}\n", path.display()));
    }

    if summary.has_skips() {
        output.push_str("Some rows or POs were skipped; see the log for details.\n");
    }

    output
}

/// Generate help text
fn help_text() -> String {
    r#"po-harvest commands:
─────────────────────────────────────────────
  run                   Extract POs created since the last run
  run <YYYY-MM-DD HH:MM> Extract POs created after the given instant
  status                Show the stored cursor and output paths
  reset                 Forget the cursor (next run takes everything)
  config                Show the effective configuration
  help, ?               Show this help message
  exit, quit, q         Exit

Credentials are read from SHIPHERO_USERNAME / SHIPHERO_PASSWORD
(a .env file in the working directory is loaded automatically).
─────────────────────────────────────────────"#
        .to_string()
}
