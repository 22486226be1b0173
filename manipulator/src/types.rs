use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ArmError;
use crate::script::Script;

/// Direction of a one degree manual nudge
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Negative,
    Positive,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Negative => -1,
            Direction::Positive => 1,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = ArmError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Negative),
            1 => Ok(Direction::Positive),
            other => Err(ArmError::InvalidDirection(other)),
        }
    }
}

#[derive(Serialize, Deserialize, Display, EnumString, Copy, Clone, Debug, PartialEq, Eq)]
pub enum GripperCommand {
    #[strum(serialize = "GripperOpen")]
    Open,
    #[strum(serialize = "GripperClose")]
    Close,
}

/// One velocity command, one value per actuator channel.
///
/// Only the channel of the moving joint is non-zero.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VelocityCommand {
    pub channels: Vec<f64>,
}

impl VelocityCommand {
    pub fn single(channel_count: usize, joint: usize, value: f64) -> Self {
        let mut channels = vec![0.0; channel_count];
        if let Some(channel) = channels.get_mut(joint) {
            *channel = value;
        }
        Self {
            channels,
        }
    }

    /// Index and value of the active channel, if any
    pub fn active(&self) -> Option<(usize, f64)> {
        self.channels.iter().copied().enumerate().find(|(_, value)| *value != 0.0)
    }
}

/// Everything the controller sends to the arm
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Velocity(VelocityCommand),
    Gripper(GripperCommand),
}

/// How a single joint move ended
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MotionOutcome {
    Reached,
    LimitRejected,
    Cancelled,
}

/// Top level requests accepted by the controller
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Run a named script
    Script(Script),
    /// Nudge a joint by one degree. `joint` is 0-based here.
    JointMove {
        joint: usize,
        direction: Direction,
    },
    /// Move every joint to an absolute target, in joint order
    ManualTarget(Vec<i32>),
    Stop,
}
