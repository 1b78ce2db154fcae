//! Brickyard CLI - run model scripts and inspect part-placement documents
//!
//! Subcommands:
//! - `run`: execute a script in the sandbox and print or save its document
//! - `inspect`: summarize a document
//! - `colors`: list the standard color table
//! - `watch`: preview a script file on every change

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use brickyard_cli::{commands, watch, AppConfig};

#[derive(Parser, Debug)]
#[command(name = "brickyard")]
#[command(about = "Run brick model scripts and inspect placement documents", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a model script and print the resulting document
    Run(RunArgs),
    /// Summarize a placement document
    Inspect(InspectArgs),
    /// List the standard colors
    Colors,
    /// Re-run a script file whenever it changes
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Script file
    script: PathBuf,

    /// Execution deadline in milliseconds (default: from config)
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Write the document to this path instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Also save the document into the store under this name
    #[arg(long)]
    save_as: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Document file
    document: PathBuf,

    /// Print the parsed document as JSON
    #[arg(long)]
    json: bool,

    /// Fail on the first malformed placement line
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Script file
    script: PathBuf,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "200")]
    poll_ms: u64,

    /// Save the displayed model under this name on exit
    #[arg(long)]
    save_as: Option<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run(&config, args).await,
        Commands::Inspect(args) => {
            let text = commands::read_text(&args.document).await?;
            let stdout = std::io::stdout();
            commands::inspect(&text, args.json, args.strict, &mut stdout.lock())
        }
        Commands::Colors => commands::colors(&mut std::io::stdout().lock()),
        Commands::Watch(args) => {
            watch::watch(
                &config,
                &args.script,
                Duration::from_millis(args.poll_ms.max(1)),
                args.save_as.as_deref(),
            )
            .await
        }
    }
}

async fn run(config: &AppConfig, args: RunArgs) -> Result<()> {
    let source = commands::read_text(&args.script).await?;

    let run_config = config.clone();
    let deadline = args.deadline_ms;
    let output = tokio::task::spawn_blocking(move || {
        commands::run_script(&run_config, &source, deadline)
    })
    .await
    .context("sandbox task failed")??;

    for line in &output.log {
        info!(target: "script", "{line}");
    }
    for issue in &output.issues {
        warn!(%issue, "model issue");
    }
    info!(
        run_id = %output.run_id,
        completion = ?output.completion,
        placements = output.placements,
        elapsed_ms = output.elapsed.as_millis() as u64,
        "script finished"
    );

    match &args.out {
        Some(path) => commands::write_text(path, &output.document).await?,
        None => std::io::stdout().lock().write_all(output.document.as_bytes())?,
    }

    if let Some(name) = &args.save_as {
        let reference = commands::save_document(config, name, &output.document).await?;
        info!(%reference, "saved");
    }
    Ok(())
}
