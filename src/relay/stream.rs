// src/relay/stream.rs

//! Read loops that drain one pipe each and emit events.

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, trace};

use crate::pipeline::Pipeline;
use crate::relay::lines::{ChunkDecoder, is_truncation_notice, split_keep_ends, split_strip_ends};
use crate::relay::sink::EventSink;
use crate::types::Event;

/// Size of a single read from a stage pipe.
pub const READ_CHUNK: usize = 64 * 1024;

/// Which pipe a relay is draining; decides how text becomes an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Build the event for one decoded chunk.
    ///
    /// A chunk may end mid-line; that last piece becomes its own entry
    /// without a line ending.
    pub fn to_event(self, file: &str, text: &str) -> Event {
        match self {
            StreamKind::Stdout => Event::Data {
                file: file.to_string(),
                lines: split_keep_ends(text),
            },
            StreamKind::Stderr if is_truncation_notice(text) => Event::Truncated {
                file: file.to_string(),
            },
            StreamKind::Stderr => Event::Error {
                file: file.to_string(),
                lines: split_strip_ends(text),
            },
        }
    }
}

/// Drain `reader` until end-of-stream, emitting one event per read.
///
/// Ends early when the sink refuses an event (session closed). A read error
/// is treated like end-of-stream. Neither case touches the pipeline or the
/// other relays.
pub async fn relay_stream<R>(file: String, mut reader: R, kind: StreamKind, sink: EventSink)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];
    let mut decoder = ChunkDecoder::new();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!(file = %file, stream = ?kind, error = %e, "read failed; ending relay");
                break;
            }
        };
        trace!(file = %file, stream = ?kind, bytes = n, "chunk read");

        if let Some(text) = decoder.push(&buf[..n]) {
            if !sink.emit(kind.to_event(&file, &text)).await {
                debug!(file = %file, stream = ?kind, "session gone; stopping relay");
                return;
            }
        }
    }

    if let Some(text) = decoder.finish() {
        let _ = sink.emit(kind.to_event(&file, &text)).await;
    }
    debug!(file = %file, stream = ?kind, generation = sink.generation(), "relay reached end of stream");
}

/// Start a relay for every exposed stream of `pipeline`: the terminal
/// stage's stdout and each stage's stderr.
///
/// Relay tasks are spawned on the pipeline's runtime and registered on their
/// stage, so killing the pipeline aborts them.
pub fn attach_relays(pipeline: &mut Pipeline, sink: &EventSink) {
    let file = pipeline.file().to_string();
    let runtime = pipeline.runtime().clone();

    for stage in pipeline.stages_mut() {
        if let Some(stdout) = stage.take_stdout() {
            let relay = runtime.spawn(relay_stream(
                file.clone(),
                stdout,
                StreamKind::Stdout,
                sink.clone(),
            ));
            stage.push_relay(relay);
        }
        if let Some(stderr) = stage.take_stderr() {
            let relay = runtime.spawn(relay_stream(
                file.clone(),
                stderr,
                StreamKind::Stderr,
                sink.clone(),
            ));
            stage.push_relay(relay);
        }
    }
}
