// src/server/http.rs

//! Plain HTTP endpoints: file listing and raw download.

use std::time::UNIX_EPOCH;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::server::AppState;

/// Body of `GET /files`.
#[derive(Debug, Serialize)]
pub struct FileListing {
    /// `[path, size in bytes, mtime in seconds since the epoch]`
    pub files: Vec<(String, u64, f64)>,
}

/// List allow-listed files the server can currently read.
pub async fn list_files(State(state): State<AppState>) -> Json<FileListing> {
    let mut files = Vec::new();
    for path in state.allow_list.files() {
        match stat_readable(path).await {
            Some((size, mtime)) => files.push((path.to_string(), size, mtime)),
            None => debug!(file = %path, "skipping unreadable file in listing"),
        }
    }
    Json(FileListing { files })
}

async fn stat_readable(path: &str) -> Option<(u64, f64)> {
    // Readable means openable by this process.
    tokio::fs::File::open(path).await.ok()?;
    let meta = tokio::fs::metadata(path).await.ok()?;
    if !meta.is_file() {
        return None;
    }
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Some((meta.len(), mtime))
}

/// Return the raw contents of an allow-listed file.
///
/// The route captures everything after `/fetch/`, so both
/// `/fetch//var/log/app.log` and `/fetch/var/log/app.log` name
/// `/var/log/app.log`.
pub async fn fetch_file(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    if !state.allow_transfers {
        return error_page(StatusCode::INTERNAL_SERVER_ERROR, "transfers not allowed");
    }

    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };

    if !state.allow_list.contains(&path) {
        debug!(file = %path, "fetch of file outside allow-list");
        return error_page(StatusCode::NOT_FOUND, "file not found");
    }

    match tokio::fs::read(&path).await {
        Ok(contents) => ([(header::CONTENT_TYPE, "text/plain")], contents).into_response(),
        Err(e) => {
            warn!(file = %path, error = %e, "failed to read file for fetch");
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "file could not be read")
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let code = status.as_u16();
    let body = format!(
        "<html><title>{code}: {message}</title><body><tt>{code}: {message}</tt></body></html>"
    );
    (status, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}
