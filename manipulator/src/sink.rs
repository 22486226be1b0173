use std::sync::mpsc::Sender;

use crate::error::{ArmError, Result};
use crate::types::{GripperCommand, Output, VelocityCommand};

/// Outgoing side of the arm transport
pub trait CommandSink: Send {
    fn send_velocity(&mut self, command: VelocityCommand) -> Result<()>;

    fn send_gripper(&mut self, command: GripperCommand) -> Result<()>;
}

impl CommandSink for Sender<Output> {
    fn send_velocity(&mut self, command: VelocityCommand) -> Result<()> {
        self.send(Output::Velocity(command)).map_err(|_| ArmError::Transport)
    }

    fn send_gripper(&mut self, command: GripperCommand) -> Result<()> {
        self.send(Output::Gripper(command)).map_err(|_| ArmError::Transport)
    }
}
