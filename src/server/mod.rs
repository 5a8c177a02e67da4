// src/server/mod.rs

//! HTTP/WebSocket front end.
//!
//! - `GET <root>/ws`: WebSocket, one [`Session`](crate::session::Session)
//!   per connection.
//! - `GET <root>/files`: allow-listed files with size and mtime.
//! - `GET <root>/fetch/<path>`: raw file download, gated by
//!   `allow_transfers`.

pub mod http;
pub mod ws;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tower_http::trace::TraceLayer;

use crate::config::{AllowList, CommandPaths, ConfigFile};
use crate::errors::Result;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub allow_list: Arc<AllowList>,
    pub commands: CommandPaths,
    pub allow_transfers: bool,
    /// Runtime that pipelines spawn their relay and reaper tasks on.
    pub runtime: Handle,
    sessions: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        allow_list: Arc<AllowList>,
        commands: CommandPaths,
        allow_transfers: bool,
        runtime: Handle,
    ) -> Self {
        Self {
            allow_list,
            commands,
            allow_transfers,
            runtime,
            sessions: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(cfg: &ConfigFile, runtime: Handle) -> Self {
        Self::new(
            Arc::clone(&cfg.allow_list),
            cfg.commands.clone(),
            cfg.server.allow_transfers,
            runtime,
        )
    }

    pub(crate) fn next_session_id(&self) -> u64 {
        self.sessions.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Build the router, nested under `relative_root` unless it is `/`.
pub fn app(state: AppState, relative_root: &str) -> Router {
    let routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/files", get(http::list_files))
        .route("/fetch/{*path}", get(http::fetch_file))
        .with_state(state);

    let router = if relative_root == "/" {
        routes
    } else {
        Router::new().nest(relative_root, routes)
    };

    router.layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
