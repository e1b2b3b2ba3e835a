//! grab - cached, integrity-verified downloads
//!
//! Thin CLI over the cache and archive crates. The selected path (or digest)
//! goes to stdout; progress and diagnostics go to stderr.

mod cli;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use grab_archive::Extractor;
use grab_cache::Fetcher;
use grab_config::Config;
use grab_events::{EventEmitter, EventReceiver, EventSender, FailureContext};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tokio::select;
use tracing::{error, info};

/// Result of a successful command
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CommandOutput {
    Path { path: PathBuf },
    Digest { path: PathBuf, sha256: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(output) => {
            if let Err(e) = render_output(&output, json_mode) {
                error!("Failed to write output: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Application error: {}", e);
            if json_mode {
                let report = serde_json::json!({
                    "error": e.to_string(),
                    "code": e.code(),
                });
                println!("{report}");
            } else {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<CommandOutput, CliError> {
    info!("Starting grab v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults), 2. environment, 3. CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let (event_sender, event_receiver) = grab_events::channel();

    let colors_enabled = console::Term::stderr().features().colors_supported();
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.json);

    let result = execute_command_with_events(
        cli.command,
        config,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    info!("Command completed successfully");
    Ok(result)
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutput, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(message) = event_receiver.try_recv() {
                    event_handler.handle_event(message);
                }
                return result;
            }

            Some(message) = event_receiver.recv() => {
                event_handler.handle_event(message);
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    tx: EventSender,
) -> Result<CommandOutput, CliError> {
    let operation = command_name(&command);
    tx.emit_operation_started(operation);

    let result = dispatch(command, &config, &tx).await;

    match &result {
        Ok(_) => tx.emit_operation_completed(operation, true),
        Err(CliError::Grab(e)) => {
            tx.emit_operation_failed(operation, FailureContext::from_error(e));
        }
        Err(e) => tx.emit_error(e.to_string()),
    }

    result
}

/// Run a single command against the cache and archive crates
async fn dispatch(
    command: Commands,
    config: &Config,
    tx: &EventSender,
) -> Result<CommandOutput, CliError> {
    match command {
        Commands::Fetch {
            filename,
            url,
            sha256,
        } => {
            let fetcher = Fetcher::from_config(config)?.with_event_sender(tx.clone());
            let path = fetcher.fetch(&filename, &url, &sha256).await?;
            Ok(CommandOutput::Path { path })
        }

        Commands::Extract { archive, path } => {
            let extractor = Extractor::new().with_event_sender(tx.clone());
            let path = extractor.extract(&archive, &path).await?;
            Ok(CommandOutput::Path { path })
        }

        Commands::Get {
            filename,
            url,
            sha256,
            path,
        } => {
            let fetcher = Fetcher::from_config(config)?.with_event_sender(tx.clone());
            let archive = fetcher.fetch(&filename, &url, &sha256).await?;
            let extractor = Extractor::new().with_event_sender(tx.clone());
            let path = extractor.extract(&archive, &path).await?;
            Ok(CommandOutput::Path { path })
        }

        Commands::Hash { file } => {
            let sha256 = grab_hash::digest(&file).await?;
            Ok(CommandOutput::Digest { path: file, sha256 })
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Fetch { .. } => "fetch",
        Commands::Extract { .. } => "extract",
        Commands::Get { .. } => "get",
        Commands::Hash { .. } => "hash",
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(cache_dir) = &global.cache_dir {
        config.cache.root = Some(cache_dir.clone());
    }
}

fn render_output(output: &CommandOutput, json_mode: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json_mode {
        let line = serde_json::to_string(output).map_err(grab_errors::Error::from)?;
        writeln!(out, "{line}")?;
    } else {
        match output {
            CommandOutput::Path { path } => writeln!(out, "{}", path.display())?,
            CommandOutput::Digest { path, sha256 } => {
                writeln!(out, "{sha256}  {}", path.display())?;
            }
        }
    }
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        if debug_enabled {
            // Structured logs on stderr keep stdout parseable
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,grab=debug")),
                )
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_writer(std::io::sink)
                .with_env_filter("off")
                .init();
        }
    } else if debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,grab=debug")),
            )
            .init();
    } else {
        // Normal mode: events are rendered by the handler, not logged
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("warn,grab::logging=off")
            .init();
    }
}
