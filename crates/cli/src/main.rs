//! merge-resolve command-line tool.
//!
//! Resolves Git merge conflict markers in place using an AI resolution
//! provider, with optional per-hunk interactive review, and manages the
//! per-repository configuration store.

mod review;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tracing_subscriber::EnvFilter;

use mergeresolve_core::config::Config;
use mergeresolve_core::engine::ResolveEngine;
use mergeresolve_core::errors::ConfigError;
use mergeresolve_core::git;
use mergeresolve_core::provider::GeminiProvider;
use mergeresolve_core::session::ReviewGate;

use review::{ConsoleSink, TerminalGate};

/// Exit code for a missing API credential.
const EXIT_NO_CREDENTIAL: u8 = 2;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// merge-resolve command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "merge-resolve",
    version,
    about = "AI-powered Git merge conflict resolver"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve conflicts in the given files, or in every conflicted file
    /// the repository reports when none are given.
    Resolve {
        /// Files to resolve.
        files: Vec<PathBuf>,

        /// Review each suggestion before it is applied.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Show the effective configuration, or set a value.
    Config {
        /// A `key=value` pair to persist; omit to list the configuration.
        entry: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    // Minimal logging for CLI
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", style::error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Resolve { files, interactive } => cmd_resolve(files, interactive).await,
        Commands::Config { entry } => cmd_config(entry.as_deref()),
    }
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

async fn cmd_resolve(files: Vec<PathBuf>, interactive: bool) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let repo_root = git::discover_repo_root(&cwd);
    let config = Config::load(&repo_root).context("failed to load configuration")?;

    // A missing credential is reported before any file is touched.
    let provider = match GeminiProvider::from_config(&config) {
        Ok(provider) => provider,
        Err(e @ ConfigError::MissingApiKey) => {
            eprintln!("{}", style::error(&e.to_string()));
            return Ok(ExitCode::from(EXIT_NO_CREDENTIAL));
        }
        Err(e) => return Err(e.into()),
    };

    let targets = if files.is_empty() {
        git::detect_conflicted_files(&repo_root).context("failed to query the git index")?
    } else {
        files
    };
    if targets.is_empty() {
        println!("{}", style::success("No merge conflicts detected."));
        return Ok(ExitCode::SUCCESS);
    }

    let sink = ConsoleSink::new(interactive);
    let engine = ResolveEngine::new(&provider, &sink);
    let mut terminal_gate = TerminalGate;
    let gate: Option<&mut dyn ReviewGate> = if interactive {
        Some(&mut terminal_gate)
    } else {
        None
    };

    let report = engine.run(&targets, gate).await;

    println!();
    println!(
        "Summary: {}/{} file(s) updated.",
        report.changed, report.total
    );
    if report.changed > 0 {
        println!("{}", style::dim("Backups saved with the .imr.bak suffix."));
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(entry: Option<&str>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let repo_root = git::discover_repo_root(&cwd);

    match entry {
        Some(pair) => {
            let (key, value) = pair
                .split_once('=')
                .context("expected key=value, e.g. merge-resolve config apiKey=YOUR_KEY")?;
            let path = Config::set_value(&repo_root, key.trim(), value)?;
            println!(
                "{}",
                style::success(&format!("Updated '{}' in {}", key.trim(), path.display()))
            );
        }
        None => {
            let config = Config::load(&repo_root).context("failed to load configuration")?;

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Key", "Value"]);
            for (key, value) in config.display_entries() {
                table.add_row(vec![Cell::new(&key), Cell::new(&value)]);
            }

            println!("{table}");
            println!("{}", style::dim(&config.source_path.display().to_string()));
        }
    }

    Ok(ExitCode::SUCCESS)
}
