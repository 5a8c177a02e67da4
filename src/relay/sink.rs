// src/relay/sink.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::types::Event;

/// An event tagged with the generation of the pipeline that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub generation: u64,
    pub event: Event,
}

/// Where relays deliver their events.
///
/// Each launched pipeline gets its own sink carrying that pipeline's
/// generation, so the session can tell current output from leftovers of a
/// pipeline it already replaced. The `connected` flag is shared with the
/// session and cleared when the connection closes; after that every emit is
/// refused.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    connected: Arc<AtomicBool>,
    tx: mpsc::Sender<PipelineOutput>,
}

impl EventSink {
    pub fn new(
        generation: u64,
        connected: Arc<AtomicBool>,
        tx: mpsc::Sender<PipelineOutput>,
    ) -> Self {
        Self {
            generation,
            connected,
            tx,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Deliver an event. Returns `false` once the session is gone, which
    /// tells the relay to stop reading.
    pub async fn emit(&self, event: Event) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.tx
            .send(PipelineOutput {
                generation: self.generation,
                event,
            })
            .await
            .is_ok()
    }
}
