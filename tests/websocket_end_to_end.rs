// tests/websocket_end_to_end.rs
//
// Full stack: real listener, real WebSocket client, real `tail`/`grep`.

#![cfg(unix)]

mod common;
use crate::common::{TestResult, init_tracing, with_timeout, write_log};

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Handle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use tailrelay::server::{self, AppState};
use tailrelay_test_utils::builders::ConfigBuilder;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(files: &[&str]) -> Result<SocketAddr, Box<dyn std::error::Error>> {
    let cfg = files
        .iter()
        .fold(ConfigBuilder::new(), |b, f| b.with_file(*f))
        .build();
    let state = AppState::from_config(&cfg, Handle::current());
    let app = server::app(state, &cfg.server.relative_root);

    let listener = TcpListener::bind(cfg.server.bind).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(server::serve(listener, app, std::future::pending()));
    Ok(addr)
}

async fn connect(addr: SocketAddr) -> Result<Client, Box<dyn std::error::Error>> {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await?;
    Ok(ws)
}

async fn send_json(ws: &mut Client, value: serde_json::Value) -> TestResult {
    ws.send(Message::Text(value.to_string().into())).await?;
    Ok(())
}

/// Read frames until `n` data lines for `file` have arrived.
async fn read_lines(ws: &mut Client, file: &str, n: usize) -> Vec<String> {
    with_timeout(async {
        let mut lines = Vec::new();
        while lines.len() < n {
            let msg = ws.next().await.expect("socket open").expect("frame");
            let Message::Text(text) = msg else { continue };
            let json: serde_json::Value = serde_json::from_str(text.as_str()).expect("json frame");
            if let Some(batch) = json.get(file).and_then(|v| v.as_array()) {
                lines.extend(batch.iter().filter_map(|l| l.as_str().map(str::to_string)));
            }
        }
        lines
    })
    .await
}

#[tokio::test]
async fn tail_command_streams_file_lines() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = write_log(dir.path(), "app.log", "a\nb\nc\n");
    let addr = start_server(&[path.as_str()]).await?;
    let mut ws = connect(addr).await?;

    send_json(&mut ws, serde_json::json!({"tail": path, "last": 2})).await?;
    assert_eq!(read_lines(&mut ws, &path, 2).await, vec!["b\n", "c\n"]);
    Ok(())
}

#[tokio::test]
async fn grep_command_filters_lines() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = write_log(dir.path(), "app.log", "ok 1\nfail 2\nok 3\nfail 4\n");
    let addr = start_server(&[path.as_str()]).await?;
    let mut ws = connect(addr).await?;

    send_json(&mut ws, serde_json::json!({"grep": path, "script": "fail"})).await?;
    assert_eq!(
        read_lines(&mut ws, &path, 2).await,
        vec!["fail 2\n", "fail 4\n"]
    );
    Ok(())
}

#[tokio::test]
async fn new_command_switches_files() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let first = write_log(dir.path(), "first.log", "from first\n");
    let second = write_log(dir.path(), "second.log", "from second\n");
    let addr = start_server(&[first.as_str(), second.as_str()]).await?;
    let mut ws = connect(addr).await?;

    send_json(&mut ws, serde_json::json!({"tail": first})).await?;
    assert_eq!(read_lines(&mut ws, &first, 1).await, vec!["from first\n"]);

    send_json(&mut ws, serde_json::json!({"tail": second})).await?;
    assert_eq!(read_lines(&mut ws, &second, 1).await, vec!["from second\n"]);
    Ok(())
}

#[tokio::test]
async fn unlisted_file_gets_no_reply() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let listed = write_log(dir.path(), "app.log", "x\n");
    let unlisted = write_log(dir.path(), "private.log", "secret\n");
    let addr = start_server(&[listed.as_str()]).await?;
    let mut ws = connect(addr).await?;

    send_json(&mut ws, serde_json::json!({"tail": unlisted})).await?;
    let reply = tokio::time::timeout(Duration::from_millis(500), ws.next()).await;
    assert!(reply.is_err(), "expected silence, got {reply:?}");
    Ok(())
}

#[tokio::test]
async fn malformed_frames_do_not_end_the_session() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = write_log(dir.path(), "app.log", "still here\n");
    let addr = start_server(&[path.as_str()]).await?;
    let mut ws = connect(addr).await?;

    ws.send(Message::Text("this is not json".into())).await?;
    send_json(&mut ws, serde_json::json!({"tail": path, "last": "three"})).await?;
    send_json(&mut ws, serde_json::json!({"unknown": path})).await?;
    send_json(&mut ws, serde_json::json!({"tail": path})).await?;

    assert_eq!(read_lines(&mut ws, &path, 1).await, vec!["still here\n"]);
    Ok(())
}

#[tokio::test]
async fn sessions_are_independent() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = write_log(dir.path(), "app.log", "shared\n");
    let addr = start_server(&[path.as_str()]).await?;

    let mut one = connect(addr).await?;
    let mut two = connect(addr).await?;
    send_json(&mut one, serde_json::json!({"tail": path})).await?;
    send_json(&mut two, serde_json::json!({"tail": path})).await?;

    assert_eq!(read_lines(&mut one, &path, 1).await, vec!["shared\n"]);
    assert_eq!(read_lines(&mut two, &path, 1).await, vec!["shared\n"]);

    one.close(None).await?;
    std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, b"more\n"))?;
    assert_eq!(read_lines(&mut two, &path, 1).await, vec!["more\n"]);
    Ok(())
}
