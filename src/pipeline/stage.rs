// src/pipeline/stage.rs

//! Stage planning (argv construction) and the handle for a running stage.

use std::fmt;

use tokio::process::{Child, ChildStderr, ChildStdout, Command as ProcessCommand};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::CommandPaths;
use crate::types::{Command, FilterKind};

/// Position of a stage in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageRole {
    /// `tail -f`, reads the file.
    Source,
    /// `grep` / `awk`, reads the source stage's stdout.
    Filter(FilterKind),
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageRole::Source => f.write_str("tail"),
            StageRole::Filter(kind) => write!(f, "{kind}"),
        }
    }
}

/// What to run for one stage: the program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub role: StageRole,
    pub program: String,
    pub args: Vec<String>,
}

impl StageSpec {
    /// `tail -n <last> -f <file>`
    pub fn tail(program: &str, last: u64, file: &str) -> Self {
        Self {
            role: StageRole::Source,
            program: program.to_string(),
            args: vec![
                "-n".to_string(),
                last.to_string(),
                "-f".to_string(),
                file.to_string(),
            ],
        }
    }

    /// `grep --line-buffered --color=never -e <pattern> [<file>]`
    pub fn grep(program: &str, pattern: &str, file: Option<&str>) -> Self {
        let mut args = vec![
            "--line-buffered".to_string(),
            "--color=never".to_string(),
            "-e".to_string(),
            pattern.to_string(),
        ];
        args.extend(file.map(str::to_string));
        Self {
            role: StageRole::Filter(FilterKind::Grep),
            program: program.to_string(),
            args,
        }
    }

    /// `awk --sandbox <script> [<file>]`
    pub fn awk(program: &str, script: &str, file: Option<&str>) -> Self {
        let mut args = vec!["--sandbox".to_string(), script.to_string()];
        args.extend(file.map(str::to_string));
        Self {
            role: StageRole::Filter(FilterKind::Awk),
            program: program.to_string(),
            args,
        }
    }

    /// Full argv, program first. Used for logging and tests.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    pub(crate) fn to_command(&self) -> ProcessCommand {
        let mut cmd = ProcessCommand::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Stages needed to satisfy `command`, source first.
///
/// A tail command yields one stage. A filter command yields two: the source
/// stage feeds the filter stage through a pipe, so the filter gets no file
/// operand of its own.
pub fn plan_stages(command: &Command, paths: &CommandPaths) -> Vec<StageSpec> {
    match command {
        Command::Tail { file, last } => vec![StageSpec::tail(&paths.tail, *last, file)],
        Command::Filter {
            kind,
            file,
            last,
            script,
        } => {
            let filter = match kind {
                FilterKind::Grep => StageSpec::grep(&paths.grep, script, None),
                FilterKind::Awk => StageSpec::awk(&paths.awk, script, None),
            };
            vec![StageSpec::tail(&paths.tail, *last, file), filter]
        }
    }
}

/// A launched stage process plus the streams and relay tasks attached to it.
///
/// `stdout` is only ever present on the terminal stage; a non-terminal
/// stage's stdout was handed to the next stage as its stdin.
#[derive(Debug)]
pub struct Stage {
    spec: StageSpec,
    pid: Option<u32>,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    relays: Vec<JoinHandle<()>>,
}

impl Stage {
    pub(crate) fn new(spec: StageSpec, mut child: Child) -> Self {
        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        Self {
            spec,
            pid,
            child: Some(child),
            stdout,
            stderr,
            relays: Vec::new(),
        }
    }

    pub fn role(&self) -> StageRole {
        self.spec.role
    }

    pub fn spec(&self) -> &StageSpec {
        &self.spec
    }

    /// OS process id, if the process had not already been reaped at spawn.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether `kill` has already run for this stage.
    pub fn is_killed(&self) -> bool {
        self.child.is_none()
    }

    pub fn has_stdout(&self) -> bool {
        self.stdout.is_some()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Register a relay task so that `kill` can stop it.
    pub fn push_relay(&mut self, relay: JoinHandle<()>) {
        self.relays.push(relay);
    }

    /// Stop relays, close pipes and send SIGKILL without waiting.
    ///
    /// The child is moved into a task on `runtime` that reaps it. Calling
    /// this again is a no-op.
    pub(crate) fn kill(&mut self, runtime: &Handle) {
        for relay in self.relays.drain(..) {
            relay.abort();
        }
        self.stdout.take();
        self.stderr.take();

        let Some(mut child) = self.child.take() else {
            return;
        };

        let role = self.spec.role;
        let pid = self.pid;
        match child.start_kill() {
            Ok(()) => debug!(stage = %role, ?pid, "sent kill to stage process"),
            Err(e) => debug!(
                stage = %role,
                ?pid,
                error = %e,
                "stage process already gone when killing"
            ),
        }

        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(stage = %role, ?pid, %status, "stage process reaped"),
                Err(e) => debug!(stage = %role, ?pid, error = %e, "waiting for killed stage failed"),
            }
        });
    }
}
