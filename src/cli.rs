//! Command-line interface.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;

use crate::config::Settings;
use crate::engine::FlowRunner;
use crate::parser;
use crate::report::ParseReport;
use crate::sim::{SimulatedChat, SimulatedEmbed};

#[derive(Parser)]
#[command(name = "flowscript")]
#[command(about = "Flowscript - a streaming workflow language for chat models", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a script and print the parse report
    Check {
        /// Script file to parse
        file: PathBuf,

        /// Emit the report as one JSON document
        #[arg(long)]
        json: bool,
    },

    /// Execute a script against the built-in simulator
    Run {
        /// Script file to execute
        file: PathBuf,

        /// Delay between streamed words in milliseconds (overrides config)
        #[arg(long)]
        chat_delay_ms: Option<u64>,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Check { file, json } => {
            let source = read_script(&file)?;
            let script = parser::parse(&source);
            let report = ParseReport::new(&script);
            if json {
                println!("{}", report.render_json()?);
            } else {
                print!("{}", report.render_text()?);
            }
            if !script.is_clean() {
                std::process::exit(1);
            }
        }

        Commands::Run {
            file,
            chat_delay_ms,
        } => {
            let source = read_script(&file)?;
            let runner = FlowRunner::new(
                Arc::new(SimulatedChat::new(
                    chat_delay_ms.unwrap_or(settings.chat_delay_ms),
                )),
                Arc::new(SimulatedEmbed::new(settings.embedding_dims)),
            );

            let mut transcript = runner.run_script(&source);
            let mut stdout = std::io::stdout();
            while let Some(piece) = transcript.next().await {
                stdout.write_all(piece.as_bytes())?;
                stdout.flush()?;
            }
            println!();
        }
    }

    Ok(())
}

fn read_script(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}
