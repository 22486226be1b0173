use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use crate::cancel::CancellationFlag;
use crate::config::{ArmParameters, Conversion};
use crate::error::Result;
use crate::feedback::FeedbackIngest;
use crate::sink::CommandSink;
use crate::store::JointStore;
use crate::tracker::PositionTracker;
use crate::types::{GripperCommand, Output, VelocityCommand};

enum Feedback {
    /// Samples are ingested before the command returns
    Inline(FeedbackIngest),
    /// Samples are published for a feedback thread
    Channel(Sender<Vec<f64>>),
}

/// Stand-in for the arm: every velocity command moves its joint one degree
/// and publishes the new position as raw radians.
pub struct SimulatedArm {
    degrees: Vec<i32>,
    conversion: Conversion,
    feedback: Feedback,
    outputs: Sender<Output>,
    cancel_after: Option<(usize, CancellationFlag)>,
    commands: usize,
}

impl SimulatedArm {
    /// Arm feeding the tracker directly. Returns the receiving end of
    /// every command the arm got.
    pub fn new(
        params: &ArmParameters,
        tracker: Arc<PositionTracker>,
        store: Box<dyn JointStore>,
    ) -> (Self, Receiver<Output>) {
        let degrees = tracker.snapshot();
        let ingest = FeedbackIngest::new(params, tracker, store);
        Self::build(params, degrees, Feedback::Inline(ingest))
    }

    /// Arm publishing raw samples on `samples`, starting from `degrees`
    pub fn with_channel(
        params: &ArmParameters,
        degrees: Vec<i32>,
        samples: Sender<Vec<f64>>,
    ) -> (Self, Receiver<Output>) {
        Self::build(params, degrees, Feedback::Channel(samples))
    }

    fn build(params: &ArmParameters, degrees: Vec<i32>, feedback: Feedback) -> (Self, Receiver<Output>) {
        let (outputs, receiver) = channel();
        let arm = Self {
            degrees,
            conversion: params.conversion,
            feedback,
            outputs,
            cancel_after: None,
            commands: 0,
        };
        (arm, receiver)
    }

    /// Set `flag` once `count` velocity commands were received
    pub fn cancel_after(mut self, count: usize, flag: CancellationFlag) -> Self {
        self.cancel_after = Some((count, flag));
        self
    }

    pub fn raw(&self) -> Vec<f64> {
        self.degrees
            .iter()
            .map(|degrees| f64::from(*degrees) * self.conversion.scale + self.conversion.offset)
            .collect()
    }

    fn publish(&mut self) {
        let raw = self.raw();
        match &mut self.feedback {
            Feedback::Inline(ingest) => {
                if let Err(e) = ingest.ingest(&raw) {
                    log::warn!("Simulated feedback rejected: {}", e);
                }
            },
            Feedback::Channel(samples) => {
                let _ = samples.send(raw);
            },
        }
    }
}

impl CommandSink for SimulatedArm {
    fn send_velocity(&mut self, command: VelocityCommand) -> Result<()> {
        if let Some((joint, value)) = command.active() {
            if let Some(degrees) = self.degrees.get_mut(joint) {
                *degrees += value.signum() as i32;
            }
        }
        let _ = self.outputs.send(Output::Velocity(command));
        self.commands += 1;
        if let Some((count, flag)) = &self.cancel_after {
            if self.commands >= *count {
                flag.cancel();
            }
        }
        self.publish();
        Ok(())
    }

    fn send_gripper(&mut self, command: GripperCommand) -> Result<()> {
        log::info!("Simulated arm: {}", command);
        let _ = self.outputs.send(Output::Gripper(command));
        Ok(())
    }
}
