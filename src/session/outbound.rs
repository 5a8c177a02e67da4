// src/session/outbound.rs

//! Frames queued for the client, and the gate that drops stale ones.
//!
//! Encoded frames wait in a channel until the socket writer gets to them.
//! When the session kills a pipeline, frames of that pipeline may still be
//! queued; the writer checks each frame against the [`FrameGate`] right
//! before sending and discards it unless its generation is the live one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation value meaning "no pipeline may send".
const CLOSED: u64 = 0;

/// An encoded event plus the generation of the pipeline that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub generation: u64,
    pub text: String,
}

/// Shared record of which generation's frames may still reach the client.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    live: Arc<AtomicU64>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let frames of `generation` through; every other generation is dropped.
    pub fn open_for(&self, generation: u64) {
        self.live.store(generation, Ordering::Release);
    }

    /// Drop every queued and future frame until the next `open_for`.
    pub fn close(&self) {
        self.live.store(CLOSED, Ordering::Release);
    }

    pub fn admits(&self, frame: &OutboundFrame) -> bool {
        let live = self.live.load(Ordering::Acquire);
        live != CLOSED && frame.generation == live
    }
}
