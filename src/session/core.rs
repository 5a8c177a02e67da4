// src/session/core.rs

//! Pure session state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`SessionEvent`]s and produces:
//! - an updated session state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`session::runtime::Session`) is responsible for:
//! - reading events from channels
//! - launching and killing pipelines through a `PipelineLauncher`
//! - encoding and sending events to the client
//!
//! The core has no channels, no Tokio types and no processes, so every
//! transition can be unit tested directly.

use std::sync::Arc;

use crate::config::AllowList;
use crate::session::handlers::{
    SessionStep, handle_close, handle_command, handle_launch_failed, handle_output,
};
use crate::session::{SessionEvent, SessionState};

#[derive(Debug)]
pub struct SessionCore {
    allow_list: Arc<AllowList>,
    state: SessionState,
    next_generation: u64,
}

impl SessionCore {
    pub fn new(allow_list: Arc<AllowList>) -> Self {
        Self {
            allow_list,
            state: SessionState::Idle,
            next_generation: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Handle a single session event, updating state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: SessionEvent) -> SessionStep {
        match event {
            SessionEvent::CommandReceived(command) => handle_command(
                &mut self.state,
                &mut self.next_generation,
                &self.allow_list,
                command,
            ),
            SessionEvent::PipelineOutput { generation, event } => {
                handle_output(&self.state, generation, event)
            }
            SessionEvent::LaunchFailed { generation } => {
                handle_launch_failed(&mut self.state, generation)
            }
            SessionEvent::ConnectionClosed => handle_close(&mut self.state),
        }
    }
}
