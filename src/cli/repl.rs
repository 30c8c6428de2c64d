//! Interactive prompt for po-harvest
//!
//! The operator triggers passes on demand; the cursor carries over between
//! them (and, with the file store, between sessions).

use std::io::{self, BufRead, Write};

use crate::cli::commands::{handle_command, pass_report, status_text, CommandResult};
use crate::core::Result;
use crate::harvester::Harvester;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    harvester: Harvester,
}

impl Repl {
    /// Create a REPL around an existing harvester
    pub fn with_harvester(harvester: Harvester) -> Self {
        Self { harvester }
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("po-harvest> ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            match handle_command(&input, &self.harvester) {
                Ok(CommandResult::Exit) => {
                    println!("Goodbye!");
                    break;
                }
                Ok(CommandResult::Handled(output)) => println!("{}\n", output),
                Ok(CommandResult::None) => continue,
                Ok(CommandResult::Run(since)) => {
                    println!("Fetching PO details...");
                    match self.harvester.run(since).await {
                        Ok(summary) => println!("\n{}", pass_report(&summary)),
                        Err(e) => eprintln!("\nFailed to extract PO details: {}\n", e),
                    }
                }
                Err(e) => eprintln!("Command error: {}\n", e),
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        println!("ShipHero PO Details Extractor");
        println!("═════════════════════════════");
        match status_text(&self.harvester) {
            Ok(status) => println!("{}", status),
            Err(e) => eprintln!("Could not read cursor: {}", e),
        }
        println!();
        println!("Commands: run, status, reset, config, help, exit");
        println!("─────────────────────────────────────────────");
    }
}
