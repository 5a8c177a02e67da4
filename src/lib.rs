// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod protocol;
pub mod relay;
pub mod server;
pub mod session;
pub mod types;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::{ConfigFile, UNGROUPED};
use crate::server::AppState;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the validated config and its allow-list
/// - the router (WebSocket sessions, listing, fetch)
/// - Ctrl-C handling
pub async fn run(cfg: ConfigFile, dry_run: bool) -> Result<()> {
    if dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let state = AppState::from_config(&cfg, Handle::current());
    let app = server::app(state, &cfg.server.relative_root);

    let listener = TcpListener::bind(cfg.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind))?;
    let local = listener.local_addr()?;

    info!(
        addr = %local,
        root = %cfg.server.relative_root,
        files = cfg.allow_list.len(),
        "listening"
    );

    server::serve(listener, app, shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        // Without a signal handler, run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

/// Simple dry-run output: print server settings, executables and files.
fn print_dry_run(cfg: &ConfigFile) {
    println!("tailrelay dry-run");
    println!("  server.bind = {}", cfg.server.bind);
    println!("  server.relative_root = {}", cfg.server.relative_root);
    println!("  server.allow_transfers = {}", cfg.server.allow_transfers);
    println!("  server.debug = {}", cfg.server.debug);
    println!();

    println!("commands:");
    println!("  tail = {}", cfg.commands.tail);
    println!("  grep = {}", cfg.commands.grep);
    println!("  awk = {}", cfg.commands.awk);
    println!();

    println!("files ({}):", cfg.allow_list.len());
    for (group, files) in cfg.allow_list.groups() {
        if group == UNGROUPED {
            println!("  (ungrouped)");
        } else {
            println!("  [{group}]");
        }
        for file in files {
            println!("      {file}");
        }
    }

    debug!("dry-run complete (no server started)");
}
