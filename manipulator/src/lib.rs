//! Joint motion controller and pick and place sequencer for a 4 axis arm.
//!
//! Feedback samples update a [`tracker::PositionTracker`], the
//! [`motion::MotionCommander`] drives one joint at a time towards a target
//! and the [`sequencer::ScriptSequencer`] chains moves, gripper commands and
//! pauses into scripts. A stop request cancels the running motion.

pub mod cancel;
pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod limits;
pub mod log;
pub mod motion;
pub mod remote;
pub mod script;
pub mod sequencer;
pub mod sim;
pub mod sink;
pub mod store;
pub mod tracker;
pub mod types;
