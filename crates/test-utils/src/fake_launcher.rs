use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use tailrelay::errors::SpawnError;
use tailrelay::pipeline::{PipelineLauncher, RunningPipeline, StageRole};
use tailrelay::relay::EventSink;
use tailrelay::types::Command;

#[derive(Debug, Default)]
struct LogInner {
    launched: Vec<Command>,
    sinks: Vec<EventSink>,
    killed: Vec<u64>,
}

/// Shared record of what a [`FakeLauncher`] was asked to do.
///
/// Cloning is cheap; every clone sees the same record, so a test keeps one
/// clone while the session owns the launcher.
#[derive(Debug, Clone, Default)]
pub struct LaunchLog {
    inner: Arc<Mutex<LogInner>>,
}

impl LaunchLog {
    /// Commands launched so far, in order.
    pub fn launched(&self) -> Vec<Command> {
        self.inner.lock().unwrap().launched.clone()
    }

    /// Sink handed to the `index`-th launch, for emitting events by hand.
    pub fn sink(&self, index: usize) -> Option<EventSink> {
        self.inner.lock().unwrap().sinks.get(index).cloned()
    }

    pub fn last_sink(&self) -> Option<EventSink> {
        self.inner.lock().unwrap().sinks.last().cloned()
    }

    /// Generations of the pipelines killed so far, in order.
    pub fn killed(&self) -> Vec<u64> {
        self.inner.lock().unwrap().killed.clone()
    }
}

/// A fake launcher that:
/// - records every launched command and the sink it was given
/// - returns a pipeline whose `kill` is recorded in the same log
/// - fails with a `SpawnError` for files registered via [`FakeLauncher::fail_for`].
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    log: LaunchLog,
    failing: HashSet<String>,
}

impl FakeLauncher {
    pub fn new(log: LaunchLog) -> Self {
        Self {
            log,
            failing: HashSet::new(),
        }
    }

    /// Make launches for `file` fail as if `tail` were missing.
    pub fn fail_for(mut self, file: &str) -> Self {
        self.failing.insert(file.to_string());
        self
    }
}

impl PipelineLauncher for FakeLauncher {
    fn launch(
        &mut self,
        command: &Command,
        sink: EventSink,
    ) -> Result<Box<dyn RunningPipeline>, SpawnError> {
        if self.failing.contains(command.file()) {
            return Err(SpawnError {
                role: StageRole::Source,
                program: "tail".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "fake launcher failure"),
            });
        }

        let generation = sink.generation();
        {
            let mut guard = self.log.inner.lock().unwrap();
            guard.launched.push(command.clone());
            guard.sinks.push(sink);
        }

        Ok(Box::new(FakePipeline {
            generation,
            log: self.log.clone(),
            killed: false,
        }))
    }
}

struct FakePipeline {
    generation: u64,
    log: LaunchLog,
    killed: bool,
}

impl RunningPipeline for FakePipeline {
    fn kill(&mut self) {
        if self.killed {
            return;
        }
        self.killed = true;
        self.log.inner.lock().unwrap().killed.push(self.generation);
    }
}
