//! Text front end for the controller
//!
//! One request per line:
//!
//! ```text
//! pick1 | pick2 | pick3 | pickAll | home
//! script <name>
//! move <joint 1..=N> <0|1>
//! target <angle> ... <angle>
//! stop
//! ```

use std::io::BufRead;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::controller::ControllerHandle;
use crate::error::ArmError;
use crate::script::Script;
use crate::types::{Command, Direction};

fn number<T: FromStr>(token: Option<&str>, line: &str) -> std::result::Result<T, ArmError> {
    token.and_then(|token| token.parse().ok()).ok_or_else(|| ArmError::UnknownCommand(line.to_string()))
}

/// Parse one request line. `joint_count` bounds the 1-based joint of `move`.
pub fn parse(line: &str, joint_count: usize) -> std::result::Result<Command, ArmError> {
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next().ok_or_else(|| ArmError::UnknownCommand(line.to_string()))?;

    let command = match keyword {
        "stop" => Command::Stop,
        "script" => {
            let name = tokens.next().ok_or_else(|| ArmError::UnknownCommand(line.to_string()))?;
            Command::Script(Script::from_str(name).map_err(|_| ArmError::UnknownScript(name.to_string()))?)
        },
        "move" => {
            let joint: usize = number(tokens.next(), line)?;
            let direction: i64 = number(tokens.next(), line)?;
            if joint == 0 || joint > joint_count {
                return Err(ArmError::InvalidJoint {
                    joint,
                    count: joint_count,
                });
            }
            Command::JointMove {
                joint: joint - 1,
                direction: Direction::try_from(direction)?,
            }
        },
        "target" => {
            let targets = tokens
                .by_ref()
                .map(|token| number(Some(token), line))
                .collect::<std::result::Result<Vec<i32>, _>>()?;
            if targets.len() != joint_count {
                return Err(ArmError::TargetCount {
                    expected: joint_count,
                    got: targets.len(),
                });
            }
            return Ok(Command::ManualTarget(targets));
        },
        other => match Script::from_str(other) {
            Ok(script) => Command::Script(script),
            Err(_) => return Err(ArmError::UnknownCommand(line.to_string())),
        },
    };

    if tokens.next().is_some() {
        return Err(ArmError::UnknownCommand(line.to_string()));
    }
    Ok(command)
}

/// Remote thread body: forward every parsed line to the controller until
/// the input closes
pub fn remote<R: BufRead>(input: R, handle: ControllerHandle, joint_count: usize) -> Result<()> {
    for line in input.lines() {
        let line = line.context("Reading remote input")?;
        if line.trim().is_empty() {
            continue;
        }
        match parse(&line, joint_count) {
            Ok(command) => handle.submit(command).context("Forwarding remote command")?,
            Err(e) => log::warn!("{}", e),
        }
    }
    log::info!("Remote input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_tokens() {
        assert_eq!(parse("pick1", 4).unwrap(), Command::Script(Script::Pick1));
        assert_eq!(parse("pickAll", 4).unwrap(), Command::Script(Script::PickAll));
        assert_eq!(parse("script pick3", 4).unwrap(), Command::Script(Script::Pick3));
        assert_eq!(parse("  home ", 4).unwrap(), Command::Script(Script::Home));
    }

    #[test]
    fn unknown_tokens_are_errors() {
        assert!(matches!(parse("script pick9", 4), Err(ArmError::UnknownScript(_))));
        assert!(matches!(parse("dance", 4), Err(ArmError::UnknownCommand(_))));
        assert!(matches!(parse("", 4), Err(ArmError::UnknownCommand(_))));
        assert!(matches!(parse("stop now", 4), Err(ArmError::UnknownCommand(_))));
    }

    #[test]
    fn move_is_one_based() {
        assert_eq!(
            parse("move 1 0", 4).unwrap(),
            Command::JointMove {
                joint: 0,
                direction: Direction::Negative
            }
        );
        assert_eq!(
            parse("move 4 1", 4).unwrap(),
            Command::JointMove {
                joint: 3,
                direction: Direction::Positive
            }
        );
        assert!(matches!(parse("move 0 1", 4), Err(ArmError::InvalidJoint { .. })));
        assert!(matches!(parse("move 5 1", 4), Err(ArmError::InvalidJoint { .. })));
        assert!(matches!(parse("move 2 2", 4), Err(ArmError::InvalidDirection(2))));
        assert!(matches!(parse("move two 1", 4), Err(ArmError::UnknownCommand(_))));
    }

    #[test]
    fn target_needs_every_joint() {
        assert_eq!(parse("target 0 10 -20 30", 4).unwrap(), Command::ManualTarget(vec![0, 10, -20, 30]));
        assert!(matches!(parse("target 0 10", 4), Err(ArmError::TargetCount { expected: 4, got: 2 })));
        assert!(matches!(parse("target 0 x 1 2", 4), Err(ArmError::UnknownCommand(_))));
    }

    #[test]
    fn stop_token() {
        assert_eq!(parse("stop", 4).unwrap(), Command::Stop);
    }
}
