//! # CLI Layer
//!
//! This module is **one possible client** for indice. The same API serves an
//! editor integration or the watch loop without the terminal.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Handles argument parsing
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Builds `AppContext` with API and configuration
//! - `handle_*()`: Per-command handlers that call the API and print results

use super::print::{print_config, print_messages, print_outline};
use super::setup::{Cli, Commands};
use clap::Parser;
use indice::api::{CmdResult, ConfigAction, IndiceApi};
use indice::config::IndiceConfig;
use indice::editor::Position;
use indice::error::{IndiceError, Result};
use indice::events::VaultEvent;
use indice::init::initialize;
use indice::store::fs::FsVault;
use indice::store::VaultStore;
use indice::watch::VaultWatcher;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// How long the watch loop blocks before checking for settled events again.
const WATCH_POLL: Duration = Duration::from_millis(500);

struct AppContext {
    api: IndiceApi<FsVault>,
    config: IndiceConfig,
    root: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;
    debug!(root = %ctx.root.display(), "Vault opened");

    match cli.command {
        Commands::Build { path, line, ch } => {
            let cursor = line.zip(ch).map(|(line, ch)| Position::new(line, ch));
            handle_build(&ctx, &path, cursor)
        }
        Commands::Refresh { path } => handle_refresh(&ctx, &path),
        Commands::All => handle_all(&mut ctx),
        Commands::Outline { folder } => handle_outline(&ctx, &folder),
        Commands::Watch => handle_watch(&mut ctx),
        Commands::Config { key, value } => handle_config(&ctx, key, value),
    }
}

/// Logs go to stderr; `INDICE_LOG` takes `RUST_LOG` style directives.
fn init_logging(verbose: bool) {
    let default = if verbose { "indice=debug" } else { "indice=warn" };
    let filter = EnvFilter::try_from_env("INDICE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    // Only fails when a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let ctx = initialize(&cwd, cli.vault.clone())?;

    Ok(AppContext {
        api: ctx.api,
        config: ctx.config,
        root: ctx.root,
    })
}

fn handle_build(ctx: &AppContext, path: &str, cursor: Option<Position>) -> Result<()> {
    let result = ctx.api.build_index(path, cursor)?;
    finish(result)
}

fn handle_refresh(ctx: &AppContext, path: &str) -> Result<()> {
    let result = ctx.api.refresh(path)?;
    finish(result)
}

fn handle_all(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.rebuild_all()?;
    finish(result)
}

fn handle_outline(ctx: &AppContext, folder: &str) -> Result<()> {
    let result = ctx.api.outline(folder)?;
    if let Some(outline) = &result.outline {
        print_outline(outline);
    }
    finish(result)
}

fn handle_watch(ctx: &mut AppContext) -> Result<()> {
    let debounce = Duration::from_millis(ctx.config.debounce_ms);
    let mut watcher = VaultWatcher::new(ctx.api.store(), debounce)?;

    // Seeds the change ledger so the first edit of each document is compared
    // against its current headings.
    let seeded = ctx.api.rebuild_all()?;
    print_messages(&seeded.messages);
    info!(root = %ctx.root.display(), "Watching vault");
    println!("Watching {} (Ctrl-C to stop)", ctx.root.display());

    loop {
        let Some(event) = watcher.next_event(WATCH_POLL)? else {
            continue;
        };
        if let Some(result) = watch_step(&mut ctx.api, &event) {
            print_messages(&result.messages);
        }
    }
}

/// Applies one vault event. A failure is logged and dropped so the loop
/// keeps serving later events.
fn watch_step<S: VaultStore>(api: &mut IndiceApi<S>, event: &VaultEvent) -> Option<CmdResult> {
    debug!(event = %event, "Vault event");
    match api.handle_event(event) {
        Ok(result) => Some(result),
        Err(e) => {
            warn!(event = %event, error = %e, "Failed to handle vault event");
            None
        }
    }
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    finish(result)
}

/// Prints the messages of a finished command; error messages fail the process.
fn finish(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if result.has_errors() {
        return Err(IndiceError::Api("command finished with errors".to_string()));
    }
    Ok(())
}
