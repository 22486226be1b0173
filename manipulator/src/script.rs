//! Built-in pick and place scripts
//!
//! Angles are in degrees. Each pick script fetches a cube from one
//! compartment and drops it on the conveyor belt.

use std::time::Duration;

use strum::{Display, EnumIter, EnumString};

use crate::types::GripperCommand::{self, Close, Open};

/// Pause after closing the gripper, lets the cube settle
pub const GRIP_SETTLE: Duration = Duration::from_secs(1);

#[derive(Display, EnumString, EnumIter, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Script {
    /// Cube from the closest compartment
    #[strum(serialize = "pick1")]
    Pick1,
    /// Cube from the furthest compartment
    #[strum(serialize = "pick2")]
    Pick2,
    /// Cube from the third compartment
    #[strum(serialize = "pick3")]
    Pick3,
    /// The three pick scripts back to back
    #[strum(serialize = "pickAll")]
    PickAll,
    /// Pointing upwards with the gripper open
    #[strum(serialize = "home")]
    Home,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Move {
        joint: usize,
        target: i32,
    },
    Gripper(GripperCommand),
    Wait(Duration),
    /// Lift the arm so the base can rotate freely
    Clear,
}

/// Moves making up [`Step::Clear`]
pub const CLEAR: [(usize, i32); 3] = [(1, 35), (2, 35), (3, 0)];

const fn mv(joint: usize, target: i32) -> Step {
    Step::Move {
        joint,
        target,
    }
}

const fn grip(command: GripperCommand) -> Step {
    Step::Gripper(command)
}

const PICK1: &[Step] = &[
    grip(Open),
    grip(Open),
    mv(0, 111),
    mv(1, 42),
    mv(2, 104),
    mv(3, 27),
    grip(Close),
    grip(Close),
    Step::Wait(GRIP_SETTLE),
    Step::Clear,
    mv(0, -21),
    mv(1, 48),
    mv(2, 40),
    mv(3, 32),
    grip(Open),
    grip(Open),
];

const PICK2: &[Step] = &[
    grip(Open),
    grip(Open),
    mv(0, 110),
    mv(3, 2),
    mv(1, 55),
    mv(2, 88),
    grip(Close),
    grip(Close),
    Step::Wait(GRIP_SETTLE),
    Step::Clear,
    mv(0, -21),
    mv(1, 50),
    mv(2, 40),
    mv(3, 32),
    grip(Open),
    grip(Open),
    Step::Clear,
];

/// Unmeasured angles for the third compartment
const PICK3: &[Step] = &[
    grip(Open),
    grip(Open),
    mv(0, 125),
    mv(3, 2),
    mv(1, 50),
    mv(2, 95),
    grip(Close),
    grip(Close),
    Step::Wait(GRIP_SETTLE),
    Step::Clear,
    mv(0, -21),
    mv(1, 48),
    mv(2, 40),
    mv(3, 32),
    grip(Open),
    grip(Open),
    Step::Clear,
];

const HOME: &[Step] = &[mv(2, 0), mv(1, 0), mv(3, 0), grip(Open)];

impl Script {
    /// Steps of the script, in execution order
    pub fn steps(self) -> Vec<Step> {
        match self {
            Script::Pick1 => PICK1.to_vec(),
            Script::Pick2 => PICK2.to_vec(),
            Script::Pick3 => PICK3.to_vec(),
            Script::PickAll => [PICK1, PICK2, PICK3].concat(),
            Script::Home => HOME.to_vec(),
        }
    }
}
