// src/session/runtime.rs

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::pipeline::{PipelineLauncher, RunningPipeline};
use crate::protocol::encode_event;
use crate::relay::{EventSink, PipelineOutput};

use super::core::SessionCore;
use super::outbound::{FrameGate, OutboundFrame};
use super::{SessionCommand, SessionEvent};

/// Capacity of the channel relays write into.
const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// Drives a [`SessionCore`] for one connection.
///
/// This is the IO shell around the core: it reads control events coming
/// from the transport and output coming from relays, feeds them to the
/// core, and executes the returned commands (kill, launch, send).
///
/// Control events are polled first so that a close or a replacement
/// command is never stuck behind a backlog of output.
pub struct Session<L: PipelineLauncher> {
    id: u64,
    core: SessionCore,
    control_rx: mpsc::Receiver<SessionEvent>,
    output_rx: mpsc::Receiver<PipelineOutput>,
    output_tx: mpsc::Sender<PipelineOutput>,
    connected: Arc<AtomicBool>,
    launcher: L,
    pipeline: Option<Box<dyn RunningPipeline>>,
    outbound: mpsc::Sender<OutboundFrame>,
    gate: FrameGate,
}

impl<L: PipelineLauncher> fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("core", &self.core)
            .field("has_pipeline", &self.pipeline.is_some())
            .finish_non_exhaustive()
    }
}

impl<L: PipelineLauncher> Session<L> {
    /// - `control_rx` carries `CommandReceived` / `ConnectionClosed` from the
    ///   transport. Dropping its sender counts as a close.
    /// - `outbound` receives encoded frames for the client. Whoever drains it
    ///   must check each frame against [`Session::frame_gate`] before sending.
    pub fn new(
        id: u64,
        core: SessionCore,
        control_rx: mpsc::Receiver<SessionEvent>,
        launcher: L,
        outbound: mpsc::Sender<OutboundFrame>,
    ) -> Self {
        let (output_tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        Self {
            id,
            core,
            control_rx,
            output_rx,
            output_tx,
            connected: Arc::new(AtomicBool::new(true)),
            launcher,
            pipeline: None,
            outbound,
            gate: FrameGate::new(),
        }
    }

    /// Liveness flag shared with every sink this session hands out.
    pub fn liveness(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.connected)
    }

    /// Gate shared with the writer draining `outbound`.
    pub fn frame_gate(&self) -> FrameGate {
        self.gate.clone()
    }

    /// Main event loop. Returns once the connection is closed.
    pub async fn run(mut self) {
        debug!(session = self.id, "session started");

        loop {
            let event = tokio::select! {
                biased;
                control = self.control_rx.recv() => {
                    control.unwrap_or(SessionEvent::ConnectionClosed)
                }
                Some(output) = self.output_rx.recv() => SessionEvent::PipelineOutput {
                    generation: output.generation,
                    event: output.event,
                },
            };

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command).await;
            }

            if !step.keep_running {
                break;
            }
        }

        info!(session = self.id, "session closed");
    }

    async fn execute_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::KillPipeline => self.kill_pipeline(),
            SessionCommand::LaunchPipeline {
                generation,
                command,
            } => {
                let sink = EventSink::new(
                    generation,
                    Arc::clone(&self.connected),
                    self.output_tx.clone(),
                );
                match self.launcher.launch(&command, sink) {
                    Ok(pipeline) => {
                        debug!(
                            session = self.id,
                            generation,
                            file = %command.file(),
                            kind = command.kind_str(),
                            "pipeline active"
                        );
                        self.pipeline = Some(pipeline);
                        self.gate.open_for(generation);
                    }
                    Err(err) => {
                        warn!(
                            session = self.id,
                            generation,
                            file = %command.file(),
                            error = %err,
                            "could not start pipeline; command skipped"
                        );
                        // Only moves the core back to idle; yields no commands.
                        self.core.step(SessionEvent::LaunchFailed { generation });
                    }
                }
            }
            SessionCommand::Forward { generation, event } => match encode_event(&event) {
                Ok(text) => {
                    let frame = OutboundFrame { generation, text };
                    if self.outbound.send(frame).await.is_err() {
                        debug!(session = self.id, "outbound channel closed; dropping event");
                    }
                }
                Err(err) => {
                    warn!(session = self.id, file = %event.file(), error = %err, "failed to encode event");
                }
            },
            SessionCommand::MarkDisconnected => {
                self.gate.close();
                self.connected.store(false, Ordering::Release);
            }
        }
    }

    fn kill_pipeline(&mut self) {
        // Frames of the killed pipeline may still be queued.
        self.gate.close();
        if let Some(mut pipeline) = self.pipeline.take() {
            debug!(session = self.id, "killing current pipeline");
            pipeline.kill();
        }
    }
}
