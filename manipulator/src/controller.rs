use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cancel::CancellationFlag;
use crate::config::ArmParameters;
use crate::error::ArmError;
use crate::motion::MotionCommander;
use crate::script::Script;
use crate::sequencer::{RunReport, ScriptSequencer};
use crate::sink::CommandSink;
use crate::tracker::PositionTracker;
use crate::types::{Command, Direction};

/// Queued work. Stop never waits in the queue.
#[derive(Debug)]
enum Request {
    Script(Script),
    JointMove {
        joint: usize,
        direction: Direction,
    },
    ManualTarget(Vec<i32>),
}

impl From<Request> for Command {
    fn from(request: Request) -> Self {
        match request {
            Request::Script(script) => Command::Script(script),
            Request::JointMove {
                joint,
                direction,
            } => Command::JointMove {
                joint,
                direction,
            },
            Request::ManualTarget(targets) => Command::ManualTarget(targets),
        }
    }
}

/// Outcome of one request, sent back once the request is done
#[derive(Debug)]
pub struct Report {
    pub command: Command,
    pub result: std::result::Result<RunReport, ArmError>,
}

/// Owns the sequencer and runs requests one at a time, in arrival order.
///
/// Runs on its own thread. Feedback must be ingested elsewhere.
pub struct ArmController {
    sequencer: ScriptSequencer,
    requests: Receiver<Request>,
    reports: Sender<Report>,
}

/// Front end of a running [`ArmController`]
#[derive(Clone)]
pub struct ControllerHandle {
    requests: Sender<Request>,
    cancel: CancellationFlag,
}

impl ArmController {
    pub fn new(
        params: &ArmParameters,
        tracker: Arc<PositionTracker>,
        cancel: CancellationFlag,
        sink: Box<dyn CommandSink>,
    ) -> (Self, ControllerHandle, Receiver<Report>) {
        let (requests_tx, requests) = channel();
        let (reports, reports_rx) = channel();
        let commander = MotionCommander::new(params, tracker, cancel.clone(), sink);
        let controller = Self {
            sequencer: ScriptSequencer::new(params, commander),
            requests,
            reports,
        };
        let handle = ControllerHandle {
            requests: requests_tx,
            cancel,
        };
        (controller, handle, reports_rx)
    }

    /// Serve requests until every handle is dropped or the transport fails
    pub fn run(&mut self) -> Result<()> {
        while let Ok(request) = self.requests.recv() {
            let result = match &request {
                Request::Script(script) => self.sequencer.run_script(*script),
                Request::JointMove {
                    joint,
                    direction,
                } => self.sequencer.manual_step(*joint, *direction),
                Request::ManualTarget(targets) => self.sequencer.manual_absolute(targets),
            };

            match &result {
                Ok(report) if report.rejected() > 0 => {
                    log::warn!("{:?}: {} move(s) rejected by joint limits", request, report.rejected())
                },
                Ok(report) if report.cancelled() => log::info!("{:?}: cancelled", request),
                Ok(_) => log::info!("{:?}: done", request),
                Err(e) => log::error!("{:?}: {}", request, e),
            }
            if matches!(result, Err(ArmError::Transport)) {
                return Err(ArmError::Transport).context("Arm command transport lost");
            }
            let _ = self.reports.send(Report {
                command: request.into(),
                result,
            });
        }
        log::info!("Controller stopped");
        Ok(())
    }
}

impl ControllerHandle {
    /// Queue a request. [`Command::Stop`] does not wait in the queue, it
    /// cancels the running motion right away.
    pub fn submit(&self, command: Command) -> std::result::Result<(), ArmError> {
        let request = match command {
            Command::Stop => {
                log::info!("Stopped by user");
                self.cancel.cancel();
                return Ok(());
            },
            Command::Script(script) => Request::Script(script),
            Command::JointMove {
                joint,
                direction,
            } => Request::JointMove {
                joint,
                direction,
            },
            Command::ManualTarget(targets) => Request::ManualTarget(targets),
        };
        self.requests.send(request).map_err(|_| ArmError::ControllerStopped)
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
