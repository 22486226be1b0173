use std::thread;
use std::time::Duration;

use crate::config::{ArmParameters, CancelPolicy};
use crate::error::{ArmError, Result};
use crate::motion::MotionCommander;
use crate::script::{Script, Step, CLEAR};
use crate::types::{Direction, GripperCommand, MotionOutcome};

/// Something the sequencer actually did, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Move {
        joint: usize,
        target: i32,
        outcome: MotionOutcome,
    },
    Gripper(GripperCommand),
    Wait(Duration),
}

/// Result of one top level request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub actions: Vec<Action>,
    /// Remaining steps were dropped after a cancelled move
    pub aborted: bool,
}

impl RunReport {
    pub fn moves(&self) -> impl Iterator<Item = (usize, i32, MotionOutcome)> + '_ {
        self.actions.iter().filter_map(|action| match action {
            Action::Move {
                joint,
                target,
                outcome,
            } => Some((*joint, *target, *outcome)),
            _ => None,
        })
    }

    pub fn rejected(&self) -> usize {
        self.moves().filter(|(_, _, outcome)| *outcome == MotionOutcome::LimitRejected).count()
    }

    pub fn cancelled(&self) -> bool {
        self.moves().any(|(_, _, outcome)| outcome == MotionOutcome::Cancelled)
    }
}

/// Runs scripts and manual moves, one step after the other.
///
/// Every entry point clears the cancellation flag before its first step and
/// never again. What happens to the steps following a cancelled move is set
/// by [`CancelPolicy`].
pub struct ScriptSequencer {
    commander: MotionCommander,
    policy: CancelPolicy,
    home_before_script: bool,
}

impl ScriptSequencer {
    pub fn new(params: &ArmParameters, commander: MotionCommander) -> Self {
        Self {
            commander,
            policy: params.cancel_policy,
            home_before_script: params.home_before_script,
        }
    }

    pub fn commander(&self) -> &MotionCommander {
        &self.commander
    }

    pub fn run_script(&mut self, script: Script) -> Result<RunReport> {
        self.commander.cancel_flag().clear();
        log::info!("Running script {}", script);

        let mut steps = Vec::new();
        if self.home_before_script && script != Script::Home {
            steps.extend(Script::Home.steps());
        }
        steps.extend(script.steps());

        let report = self.execute(&steps)?;
        log::info!("Script {} done{}", script, if report.aborted { " (aborted)" } else { "" });
        Ok(report)
    }

    /// Nudge `joint` (0-based) by one degree
    pub fn manual_step(&mut self, joint: usize, direction: Direction) -> Result<RunReport> {
        self.commander.cancel_flag().clear();
        self.check_joint(joint)?;
        let current = self.commander.tracker().current(joint);
        match current.checked_add(direction.sign()) {
            Some(target) => self.execute(&[Step::Move {
                joint,
                target,
            }]),
            None => {
                log::warn!("Joint {} cannot move past {}", joint, current);
                Ok(RunReport {
                    actions: vec![Action::Move {
                        joint,
                        target: current,
                        outcome: MotionOutcome::LimitRejected,
                    }],
                    aborted: false,
                })
            },
        }
    }

    /// Move every joint to its target, joint 0 first
    pub fn manual_absolute(&mut self, targets: &[i32]) -> Result<RunReport> {
        self.commander.cancel_flag().clear();
        let expected = self.commander.joint_count();
        if targets.len() != expected {
            return Err(ArmError::TargetCount {
                expected,
                got: targets.len(),
            });
        }
        let steps = targets
            .iter()
            .enumerate()
            .map(|(joint, target)| Step::Move {
                joint,
                target: *target,
            })
            .collect::<Vec<_>>();
        self.execute(&steps)
    }

    fn check_joint(&self, joint: usize) -> Result<()> {
        let count = self.commander.joint_count();
        if joint < count {
            Ok(())
        } else {
            Err(ArmError::InvalidJoint {
                joint,
                count,
            })
        }
    }

    fn execute(&mut self, steps: &[Step]) -> Result<RunReport> {
        let mut report = RunReport::default();
        for step in steps {
            let cancelled = match *step {
                Step::Move {
                    joint,
                    target,
                } => self.move_joint(joint, target, &mut report)?,
                Step::Clear => {
                    let mut cancelled = false;
                    for (joint, target) in CLEAR {
                        cancelled = self.move_joint(joint, target, &mut report)?;
                        if cancelled && self.policy == CancelPolicy::Abort {
                            break;
                        }
                    }
                    cancelled
                },
                Step::Gripper(command) => {
                    self.commander.gripper(command)?;
                    report.actions.push(Action::Gripper(command));
                    false
                },
                Step::Wait(duration) => {
                    thread::sleep(duration);
                    report.actions.push(Action::Wait(duration));
                    false
                },
            };
            if cancelled && self.policy == CancelPolicy::Abort {
                log::info!("Cancelled, dropping the remaining steps");
                report.aborted = true;
                break;
            }
        }
        Ok(report)
    }

    /// Returns true when the move was cancelled
    fn move_joint(&mut self, joint: usize, target: i32, report: &mut RunReport) -> Result<bool> {
        let outcome = self.commander.move_to(joint, target)?;
        match outcome {
            MotionOutcome::Reached => log::debug!("Joint {} done", joint),
            MotionOutcome::LimitRejected => log::warn!("Joint {} cannot go to {}", joint, target),
            MotionOutcome::Cancelled => (),
        }
        report.actions.push(Action::Move {
            joint,
            target,
            outcome,
        });
        Ok(outcome == MotionOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationFlag;
    use crate::sim::SimulatedArm;
    use crate::store::NullStore;
    use crate::tracker::PositionTracker;
    use crate::types::{GripperCommand::*, Output};
    use std::sync::mpsc::Receiver;
    use std::sync::Arc;

    fn sequencer(params: ArmParameters) -> (ScriptSequencer, Arc<PositionTracker>, CancellationFlag, Receiver<Output>) {
        let tracker = Arc::new(PositionTracker::new(params.joint_count()));
        let cancel = CancellationFlag::new();
        let (arm, outputs) = SimulatedArm::new(&params, tracker.clone(), Box::new(NullStore));
        let commander = MotionCommander::new(&params, tracker.clone(), cancel.clone(), Box::new(arm));
        (ScriptSequencer::new(&params, commander), tracker, cancel, outputs)
    }

    fn reached(joint: usize, target: i32) -> Action {
        Action::Move {
            joint,
            target,
            outcome: MotionOutcome::Reached,
        }
    }

    fn grippers(outputs: &Receiver<Output>) -> Vec<GripperCommand> {
        outputs
            .try_iter()
            .filter_map(|output| match output {
                Output::Gripper(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pick1_runs_in_order() {
        let (mut sequencer, tracker, _, outputs) = sequencer(ArmParameters::default());
        let report = sequencer.run_script(Script::Pick1).unwrap();
        assert_eq!(
            report.actions,
            vec![
                Action::Gripper(Open),
                Action::Gripper(Open),
                reached(0, 111),
                reached(1, 42),
                reached(2, 104),
                reached(3, 27),
                Action::Gripper(Close),
                Action::Gripper(Close),
                Action::Wait(Duration::from_secs(1)),
                reached(1, 35),
                reached(2, 35),
                reached(3, 0),
                reached(0, -21),
                reached(1, 48),
                reached(2, 40),
                reached(3, 32),
                Action::Gripper(Open),
                Action::Gripper(Open),
            ]
        );
        assert!(!report.aborted);
        assert_eq!(tracker.snapshot(), vec![-21, 48, 40, 32]);
        assert_eq!(grippers(&outputs), vec![Open, Open, Close, Close, Open, Open]);
    }

    #[test]
    fn home_runs_first_when_configured() {
        let params = ArmParameters {
            home_before_script: true,
            ..Default::default()
        };
        let (mut sequencer, _, _, _) = sequencer(params);
        let report = sequencer.run_script(Script::Pick1).unwrap();
        assert_eq!(&report.actions[..4], &[reached(2, 0), reached(1, 0), reached(3, 0), Action::Gripper(Open)]);
        assert_eq!(report.actions[4], Action::Gripper(Open));
    }

    #[test]
    fn manual_step_nudges_one_degree() {
        let (mut sequencer, tracker, _, _) = sequencer(ArmParameters::default());
        sequencer.manual_step(1, Direction::Positive).unwrap();
        sequencer.manual_step(1, Direction::Positive).unwrap();
        sequencer.manual_step(3, Direction::Negative).unwrap();
        assert_eq!(tracker.snapshot(), vec![0, 2, 0, -1]);
    }

    #[test]
    fn manual_step_stops_at_the_limit() {
        let (mut sequencer, tracker, _, _) = sequencer(ArmParameters::default());
        sequencer.manual_absolute(&[0, -20, 0, 0]).unwrap();
        let report = sequencer.manual_step(1, Direction::Negative).unwrap();
        assert_eq!(report.rejected(), 1);
        assert_eq!(tracker.current(1), -20);
    }

    #[test]
    fn manual_step_at_the_integer_edge_is_rejected() {
        let (mut sequencer, tracker, _, outputs) = sequencer(ArmParameters::default());
        tracker.update(vec![i32::MAX, i32::MIN, 0, 0]);

        let report = sequencer.manual_step(0, Direction::Positive).unwrap();
        assert_eq!(report.moves().collect::<Vec<_>>(), vec![(0, i32::MAX, MotionOutcome::LimitRejected)]);
        let report = sequencer.manual_step(1, Direction::Negative).unwrap();
        assert_eq!(report.rejected(), 1);

        assert_eq!(tracker.snapshot(), vec![i32::MAX, i32::MIN, 0, 0]);
        assert_eq!(outputs.try_iter().count(), 0);
    }

    #[test]
    fn manual_step_rejects_unknown_joint() {
        let (mut sequencer, _, _, _) = sequencer(ArmParameters::default());
        assert!(matches!(
            sequencer.manual_step(4, Direction::Positive),
            Err(ArmError::InvalidJoint {
                joint: 4,
                count: 4
            })
        ));
    }

    #[test]
    fn manual_absolute_reports_each_joint() {
        let (mut sequencer, tracker, _, _) = sequencer(ArmParameters::default());
        let report = sequencer.manual_absolute(&[10, 200, -5, 3]).unwrap();
        assert_eq!(
            report.moves().collect::<Vec<_>>(),
            vec![
                (0, 10, MotionOutcome::Reached),
                (1, 200, MotionOutcome::LimitRejected),
                (2, -5, MotionOutcome::Reached),
                (3, 3, MotionOutcome::Reached),
            ]
        );
        assert_eq!(tracker.snapshot(), vec![10, 0, -5, 3]);
    }

    #[test]
    fn manual_absolute_needs_every_joint() {
        let (mut sequencer, _, _, _) = sequencer(ArmParameters::default());
        assert!(matches!(
            sequencer.manual_absolute(&[1, 2, 3]),
            Err(ArmError::TargetCount {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn new_request_clears_the_flag() {
        let (mut sequencer, tracker, cancel, _) = sequencer(ArmParameters::default());
        cancel.cancel();
        let report = sequencer.manual_absolute(&[5, 0, 0, 0]).unwrap();
        assert!(!report.cancelled());
        assert_eq!(tracker.current(0), 5);
    }

    fn cancel_during_first_move(params: ArmParameters) -> (RunReport, Receiver<Output>) {
        let tracker = Arc::new(PositionTracker::new(params.joint_count()));
        let cancel = CancellationFlag::new();
        let (arm, outputs) = SimulatedArm::new(&params, tracker.clone(), Box::new(NullStore));
        let arm = arm.cancel_after(10, cancel.clone());
        let commander = MotionCommander::new(&params, tracker, cancel, Box::new(arm));
        let mut sequencer = ScriptSequencer::new(&params, commander);
        (sequencer.run_script(Script::PickAll).unwrap(), outputs)
    }

    #[test]
    fn skip_policy_walks_the_rest_without_moving() {
        let (report, outputs) = cancel_during_first_move(ArmParameters::default());
        assert!(!report.aborted);
        let moves = report.moves().collect::<Vec<_>>();
        let expected = Script::PickAll
            .steps()
            .iter()
            .map(|step| match step {
                Step::Move {
                    ..
                } => 1,
                Step::Clear => CLEAR.len(),
                _ => 0,
            })
            .sum::<usize>();
        assert_eq!(moves.len(), expected);
        assert!(moves.iter().all(|(_, _, outcome)| *outcome == MotionOutcome::Cancelled));

        let outputs = outputs.try_iter().collect::<Vec<_>>();
        let velocities = outputs.iter().filter(|output| matches!(output, Output::Velocity(_))).count();
        assert_eq!(velocities, 10);
        // Gripper steps still run
        let gripper_count = Script::PickAll.steps().iter().filter(|step| matches!(step, Step::Gripper(_))).count();
        assert_eq!(outputs.len() - velocities, gripper_count);
    }

    #[test]
    fn abort_policy_drops_the_rest() {
        let params = ArmParameters {
            cancel_policy: CancelPolicy::Abort,
            ..Default::default()
        };
        let (report, outputs) = cancel_during_first_move(params);
        assert!(report.aborted);
        assert_eq!(
            report.actions,
            vec![
                Action::Gripper(Open),
                Action::Gripper(Open),
                Action::Move {
                    joint: 0,
                    target: 111,
                    outcome: MotionOutcome::Cancelled
                },
            ]
        );
        assert_eq!(grippers(&outputs), vec![Open, Open]);
    }
}
