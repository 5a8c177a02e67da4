// src/pipeline/mod.rs

//! Process pipeline layer.
//!
//! This module is responsible for actually running `tail` and the optional
//! filter behind it, using `tokio::process::Command`.
//!
//! - [`stage`] builds argv for each stage and wraps a running stage process.
//! - [`supervisor`] spawns and wires the stages of a pipeline and kills them.
//! - [`launcher`] provides the `PipelineLauncher` trait the session uses and
//!   the concrete `ProcessLauncher` that also attaches the stream relays.

pub mod launcher;
pub mod stage;
pub mod supervisor;

pub use launcher::{PipelineLauncher, ProcessLauncher, RunningPipeline};
pub use stage::{Stage, StageRole, StageSpec, plan_stages};
pub use supervisor::{Pipeline, ProcessSupervisor};
