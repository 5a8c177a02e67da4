// src/pipeline/launcher.rs

//! Pluggable pipeline launcher abstraction.
//!
//! The session talks to a `PipelineLauncher` instead of the supervisor
//! directly. This makes it easy to swap in a fake launcher in tests while
//! keeping the production implementation in [`ProcessLauncher`].
//!
//! - `ProcessLauncher` spawns real `tail`/`grep`/`awk` processes through
//!   [`ProcessSupervisor`] and attaches stream relays to them.
//! - Tests can provide their own `PipelineLauncher` that, for example,
//!   records launched commands and emits events through the sink by hand.

use tokio::runtime::Handle;

use crate::config::CommandPaths;
use crate::errors::SpawnError;
use crate::pipeline::supervisor::{Pipeline, ProcessSupervisor};
use crate::relay::{EventSink, attach_relays};
use crate::types::Command;

/// A launched pipeline as seen by its owning session.
pub trait RunningPipeline: Send {
    /// Terminate every stage. Must be idempotent.
    fn kill(&mut self);
}

impl RunningPipeline for Pipeline {
    fn kill(&mut self) {
        Pipeline::kill(self);
    }
}

/// Trait abstracting how a validated command becomes a running pipeline.
pub trait PipelineLauncher: Send {
    /// Start the pipeline for `command`; all of its output goes to `sink`.
    fn launch(
        &mut self,
        command: &Command,
        sink: EventSink,
    ) -> Result<Box<dyn RunningPipeline>, SpawnError>;
}

/// Real launcher used in production.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    supervisor: ProcessSupervisor,
}

impl ProcessLauncher {
    pub fn new(paths: CommandPaths, runtime: Handle) -> Self {
        Self {
            supervisor: ProcessSupervisor::new(paths, runtime),
        }
    }
}

impl PipelineLauncher for ProcessLauncher {
    fn launch(
        &mut self,
        command: &Command,
        sink: EventSink,
    ) -> Result<Box<dyn RunningPipeline>, SpawnError> {
        let mut pipeline = self.supervisor.spawn(command)?;
        attach_relays(&mut pipeline, &sink);
        Ok(Box::new(pipeline))
    }
}
