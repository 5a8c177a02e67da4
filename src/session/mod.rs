// src/session/mod.rs

//! Per-connection session engine.
//!
//! One session exists per WebSocket connection. It owns at most one running
//! pipeline, replaces it whenever a new command arrives, and forwards the
//! pipeline's events back to the client until the connection closes.
//!
//! The pure state machine lives in [`core`]; the async/IO shell that talks
//! to channels and the launcher is implemented in [`runtime`].

use crate::types::{Command, Event};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pipeline running.
    Idle,
    /// The pipeline launched as `generation` is running.
    Active { generation: u64 },
    /// Connection gone. Terminal.
    Closed,
}

/// Events flowing into a session from the transport and from relays.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The client sent a decoded command.
    CommandReceived(Command),
    /// A relay produced output for the pipeline launched as `generation`.
    PipelineOutput { generation: u64, event: Event },
    /// Launching the pipeline for `generation` failed.
    LaunchFailed { generation: u64 },
    /// The connection closed.
    ConnectionClosed,
}

pub mod core;
pub mod handlers;
pub mod outbound;
pub mod runtime;

pub use self::core::SessionCore;
pub use handlers::{SessionCommand, SessionStep};
pub use outbound::{FrameGate, OutboundFrame};
pub use runtime::Session;
