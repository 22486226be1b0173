use serde::{Deserialize, Serialize};

/// Closed bound, in degrees, a joint target must stay within
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct JointLimit {
    pub min: i32,
    pub max: i32,
}

impl JointLimit {
    pub const fn new(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
        }
    }

    pub fn contains(&self, target: i32) -> bool {
        self.min <= target && target <= self.max
    }
}

/// Safety bounds for every joint of the arm.
///
/// These are tighter than the mechanical range of the joints to keep strain
/// off the gears.
#[derive(Clone, Debug)]
pub struct LimitTable {
    limits: Vec<JointLimit>,
}

impl LimitTable {
    pub fn new(limits: Vec<JointLimit>) -> Self {
        Self {
            limits,
        }
    }

    /// True iff `target` is within the bound of `joint`.
    ///
    /// A joint without a bound is always rejected.
    pub fn check(&self, joint: usize, target: i32) -> bool {
        self.limits.get(joint).is_some_and(|limit| limit.contains(target))
    }

    pub fn get(&self, joint: usize) -> Option<JointLimit> {
        self.limits.get(joint).copied()
    }

    pub fn joint_count(&self) -> usize {
        self.limits.len()
    }
}
