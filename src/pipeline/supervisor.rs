// src/pipeline/supervisor.rs

use std::process::Stdio;

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::config::CommandPaths;
use crate::errors::SpawnError;
use crate::pipeline::stage::{Stage, StageSpec, plan_stages};
use crate::types::Command;

/// Spawns the stage processes for a command and wires them together.
///
/// The runtime handle is injected rather than taken from the ambient
/// context so that the reaper tasks started by [`Pipeline::kill`] land on a
/// runtime the caller chose.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    paths: CommandPaths,
    runtime: Handle,
}

impl ProcessSupervisor {
    pub fn new(paths: CommandPaths, runtime: Handle) -> Self {
        Self { paths, runtime }
    }

    /// Launch every stage for `command`.
    ///
    /// Each stage gets piped stdout/stderr. With a filter stage, the source
    /// stage's stdout becomes the filter's stdin and is no longer reachable
    /// from the returned pipeline. If any stage fails to launch, the stages
    /// already started are killed before the error is returned.
    pub fn spawn(&self, command: &Command) -> Result<Pipeline, SpawnError> {
        let specs = plan_stages(command, &self.paths);
        let count = specs.len();
        let mut pipeline = Pipeline::new(command.file(), self.runtime.clone());
        let mut upstream: Option<Stdio> = None;

        for (idx, spec) in specs.into_iter().enumerate() {
            let stdin = upstream.take().unwrap_or_else(Stdio::null);
            let mut stage = match spawn_stage(spec, stdin) {
                Ok(stage) => stage,
                Err(err) => {
                    pipeline.kill();
                    return Err(err);
                }
            };

            let is_terminal = idx + 1 == count;
            if !is_terminal {
                let piped: Option<std::io::Result<Stdio>> =
                    stage.take_stdout().map(TryInto::try_into);
                match piped {
                    Some(Ok(stdio)) => upstream = Some(stdio),
                    Some(Err(source)) => {
                        let err = SpawnError {
                            role: stage.role(),
                            program: stage.spec().program.clone(),
                            source,
                        };
                        pipeline.push(stage);
                        pipeline.kill();
                        return Err(err);
                    }
                    None => {}
                }
            }

            pipeline.push(stage);
        }

        info!(
            file = %pipeline.file(),
            kind = command.kind_str(),
            last = command.last(),
            pids = ?pipeline.pids(),
            "pipeline started"
        );
        Ok(pipeline)
    }
}

fn spawn_stage(spec: StageSpec, stdin: Stdio) -> Result<Stage, SpawnError> {
    let mut cmd = spec.to_command();
    cmd.stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| SpawnError {
        role: spec.role,
        program: spec.program.clone(),
        source,
    })?;

    debug!(stage = %spec.role, argv = ?spec.argv(), pid = ?child.id(), "running stage");
    Ok(Stage::new(spec, child))
}

/// An ordered chain of one or two running stages for one file.
///
/// Owned by exactly one session. Dropping the pipeline kills it.
#[derive(Debug)]
pub struct Pipeline {
    file: String,
    stages: Vec<Stage>,
    runtime: Handle,
}

impl Pipeline {
    fn new(file: &str, runtime: Handle) -> Self {
        Self {
            file: file.to_string(),
            stages: Vec::with_capacity(2),
            runtime,
        }
    }

    fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Stages in pipe order, source first.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [Stage] {
        &mut self.stages
    }

    pub fn pids(&self) -> Vec<u32> {
        self.stages.iter().filter_map(Stage::pid).collect()
    }

    /// Kill every stage: abort relays, close pipes, signal the processes.
    ///
    /// Order across stages does not matter since nothing waits for pipes
    /// to drain. Safe to call repeatedly, on partially built pipelines, and
    /// after the processes exited on their own.
    pub fn kill(&mut self) {
        let live = self.stages.iter().filter(|s| !s.is_killed()).count();
        if live == 0 {
            return;
        }
        debug!(file = %self.file, stages = live, "killing pipeline");
        for stage in &mut self.stages {
            stage.kill(&self.runtime);
        }
    }

    pub fn is_killed(&self) -> bool {
        self.stages.iter().all(Stage::is_killed)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.kill();
    }
}
