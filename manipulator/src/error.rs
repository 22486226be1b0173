use thiserror::Error;

/// Errors raised by the manipulator controller.
///
/// Motion outcomes (reached, rejected by a limit, cancelled) are not errors,
/// see [`crate::types::MotionOutcome`].
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("Malformed feedback: {0}")]
    MalformedFeedback(String),

    #[error("Joint {joint} does not exist (joint count is {count})")]
    InvalidJoint { joint: usize, count: usize },

    #[error("Direction must be 0 or 1, got {0}")]
    InvalidDirection(i64),

    #[error("Expected {expected} targets, got {got}")]
    TargetCount { expected: usize, got: usize },

    #[error("Unknown script: {0}")]
    UnknownScript(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command transport closed")]
    Transport,

    #[error("Controller is not running")]
    ControllerStopped,
}

pub type Result<T> = std::result::Result<T, ArmError>;
