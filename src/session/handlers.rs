// src/session/handlers.rs

//! Event handling logic for the session core.

use tracing::{debug, trace};

use crate::config::AllowList;
use crate::session::SessionState;
use crate::types::{Command, Event};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Kill the current pipeline, if any.
    KillPipeline,
    /// Launch a pipeline for `command`; its output is tagged `generation`.
    LaunchPipeline { generation: u64, command: Command },
    /// Encode and send this event, produced by pipeline `generation`.
    Forward { generation: u64, event: Event },
    /// Clear the liveness flag so relays stop emitting.
    MarkDisconnected,
}

/// Decision returned by the core after handling a single `SessionEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<SessionCommand>,
    /// Whether the session loop should keep running.
    pub keep_running: bool,
}

impl SessionStep {
    fn running(commands: Vec<SessionCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn stopped(commands: Vec<SessionCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Handle a new command from the client.
///
/// The current pipeline is killed before anything else, even when the new
/// command then turns out to name a file outside the allow-list. Such
/// commands leave the session idle without telling the client.
pub fn handle_command(
    state: &mut SessionState,
    next_generation: &mut u64,
    allow_list: &AllowList,
    command: Command,
) -> SessionStep {
    let mut commands = Vec::new();

    match *state {
        SessionState::Closed => return SessionStep::stopped(commands),
        SessionState::Active { .. } => commands.push(SessionCommand::KillPipeline),
        SessionState::Idle => {}
    }
    *state = SessionState::Idle;

    if !allow_list.contains(command.file()) {
        debug!(
            file = %command.file(),
            kind = command.kind_str(),
            "file not in allow-list; ignoring command"
        );
        return SessionStep::running(commands);
    }

    let generation = *next_generation;
    *next_generation += 1;
    *state = SessionState::Active { generation };
    commands.push(SessionCommand::LaunchPipeline {
        generation,
        command,
    });

    SessionStep::running(commands)
}

/// Handle output from a relay.
///
/// Only output of the currently active pipeline is forwarded; anything
/// tagged with an older generation was produced by a pipeline that has
/// since been replaced or killed.
pub fn handle_output(state: &SessionState, generation: u64, event: Event) -> SessionStep {
    match *state {
        SessionState::Active { generation: current } if current == generation => {
            SessionStep::running(vec![SessionCommand::Forward { generation, event }])
        }
        SessionState::Closed => SessionStep::stopped(Vec::new()),
        _ => {
            trace!(generation, file = %event.file(), "dropping output of stale pipeline");
            SessionStep::running(Vec::new())
        }
    }
}

/// Handle a failed launch: fall back to idle if it was the active pipeline.
pub fn handle_launch_failed(state: &mut SessionState, generation: u64) -> SessionStep {
    match *state {
        SessionState::Active { generation: current } if current == generation => {
            *state = SessionState::Idle;
            SessionStep::running(Vec::new())
        }
        SessionState::Closed => SessionStep::stopped(Vec::new()),
        _ => SessionStep::running(Vec::new()),
    }
}

/// Handle connection close: kill, mark disconnected, stop. Idempotent.
pub fn handle_close(state: &mut SessionState) -> SessionStep {
    let commands = match *state {
        SessionState::Closed => Vec::new(),
        SessionState::Active { .. } => vec![
            SessionCommand::KillPipeline,
            SessionCommand::MarkDisconnected,
        ],
        SessionState::Idle => vec![SessionCommand::MarkDisconnected],
    };
    *state = SessionState::Closed;
    SessionStep::stopped(commands)
}
