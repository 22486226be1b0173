use std::sync::Arc;
use std::time::Duration;

use crate::cancel::CancellationFlag;
use crate::config::ArmParameters;
use crate::error::Result;
use crate::limits::LimitTable;
use crate::sink::CommandSink;
use crate::tracker::PositionTracker;
use crate::types::{GripperCommand, MotionOutcome, VelocityCommand};

/// Drives one joint at a time to a target angle.
///
/// The commander only reads the tracker. Positions must be refreshed by
/// another thread, otherwise a move can never converge.
///
/// Convergence is exact integer equality. An actuator that steps over the
/// target without ever reporting it keeps the loop running until the
/// cancellation flag is set, so callers needing a hard bound must cancel on
/// their own timeout.
pub struct MotionCommander {
    limits: LimitTable,
    tracker: Arc<PositionTracker>,
    cancel: CancellationFlag,
    sink: Box<dyn CommandSink>,
    channels: usize,
    speed: f64,
    tick: Duration,
}

impl MotionCommander {
    pub fn new(
        params: &ArmParameters,
        tracker: Arc<PositionTracker>,
        cancel: CancellationFlag,
        sink: Box<dyn CommandSink>,
    ) -> Self {
        Self {
            limits: LimitTable::new(params.limits.clone()),
            tracker,
            cancel,
            sink,
            channels: params.channels,
            speed: params.speed,
            tick: params.tick(),
        }
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn cancel_flag(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn joint_count(&self) -> usize {
        self.limits.joint_count()
    }

    pub fn move_to(&mut self, joint: usize, target: i32) -> Result<MotionOutcome> {
        if !self.limits.check(joint, target) {
            log::warn!("Joint {} target {} rejected, limits are {:?}", joint, target, self.limits.get(joint));
            return Ok(MotionOutcome::LimitRejected);
        }

        let start = self.tracker.current(joint);
        // Direction is fixed for the whole move
        let velocity = if target > start {
            self.speed
        } else {
            -self.speed
        };
        log::debug!("Joint {} moving {} -> {}", joint, start, target);

        let mut commands = 0u64;
        loop {
            // A raised flag wins over an already reached target
            if self.cancel.is_cancelled() {
                log::info!("Joint {} cancelled at {} after {} commands", joint, self.tracker.current(joint), commands);
                return Ok(MotionOutcome::Cancelled);
            }
            if self.tracker.current(joint) == target {
                break;
            }
            let seen = self.tracker.generation();
            self.sink.send_velocity(VelocityCommand::single(self.channels, joint, velocity))?;
            commands += 1;
            self.tracker.wait_for_update(seen, self.tick);
        }

        log::debug!("Joint {} reached {} after {} commands", joint, target, commands);
        Ok(MotionOutcome::Reached)
    }

    pub fn gripper(&mut self, command: GripperCommand) -> Result<()> {
        log::debug!("{}", command);
        self.sink.send_gripper(command)
    }
}
