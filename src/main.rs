//! po-harvest - incremental purchase-order extraction
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use po_harvest::cli::commands::{parse_since, pass_report, status_text};
use po_harvest::{logging, Config, Harvester, Repl};

/// po-harvest - pull newly created purchase orders from the ShipHero dashboard
#[derive(Parser, Debug)]
#[command(name = "po-harvest")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Run in headed browser mode (visible window)
    #[arg(long, global = true)]
    headed: bool,

    /// Keep the cursor in memory only (nothing is persisted)
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one extraction pass and exit
    Run {
        /// CSV output path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Select POs created after this instant instead of the stored cursor
        /// (YYYY-MM-DD HH:MM)
        #[arg(long)]
        since: Option<String>,
    },
    /// Show the stored cursor
    Status,
    /// Forget the stored cursor
    Reset,
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
    /// Interactive prompt (default)
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logging::init(args.debug);

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if args.headed {
        config.browser.headed = true;
    }

    if let Some(Command::Run {
        output: Some(ref output),
        ..
    }) = args.command
    {
        config.export.output_path = output.clone();
    }

    let harvester = if args.ephemeral {
        Harvester::ephemeral(config)
    } else {
        Harvester::new(config)
    };

    match args.command.unwrap_or(Command::Interactive) {
        Command::Run { since, .. } => {
            let since = match since {
                Some(text) => match parse_since(&text) {
                    Some(t) => Some(t),
                    None => anyhow::bail!("Invalid --since '{}', expected YYYY-MM-DD HH:MM", text),
                },
                None => None,
            };

            match harvester.run(since).await {
                Ok(summary) => {
                    print!("{}", pass_report(&summary));
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("Failed to extract PO details: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Status => {
            println!("{}", status_text(&harvester)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset => {
            harvester.reset()?;
            println!("Cursor cleared.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { save } => {
            if save {
                let path = harvester.config().save()?;
                println!("Configuration written to {}", path.display());
            } else {
                print!("{}", harvester.config().to_toml());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Interactive => {
            let mut repl = Repl::with_harvester(harvester);
            repl.run().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
