#![allow(dead_code)]

pub use tailrelay_test_utils::{init_tracing, with_timeout};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use tokio::sync::mpsc;

use tailrelay::relay::{EventSink, PipelineOutput};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Write `contents` to `dir/name` and return the absolute path as a string.
pub fn write_log(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write test log");
    path.to_string_lossy().into_owned()
}

/// A connected sink for `generation` plus the receiving end and its flag.
pub fn test_sink(
    generation: u64,
) -> (EventSink, Arc<AtomicBool>, mpsc::Receiver<PipelineOutput>) {
    let (tx, rx) = mpsc::channel(64);
    let connected = Arc::new(AtomicBool::new(true));
    (EventSink::new(generation, Arc::clone(&connected), tx), connected, rx)
}

/// Poll `cond` every 10ms until it holds (bounded by `with_timeout`).
pub async fn wait_until<F: FnMut() -> bool>(mut cond: F) {
    with_timeout(async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
}
