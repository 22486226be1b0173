use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::limits::JointLimit;

pub const CONFIG_FILE: &str = "manipulator.toml";

/// What a cancelled script does with its remaining steps
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CancelPolicy {
    /// Keep walking the script: moves return immediately as cancelled while
    /// gripper commands and pauses still run.
    #[default]
    Skip,
    /// Drop every step after the first cancelled move.
    Abort,
}

/// Raw feedback to degree conversion: `round((raw - offset) / scale)`
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Conversion {
    pub offset: f64,
    pub scale: f64,
}

impl Default for Conversion {
    fn default() -> Self {
        Self {
            offset: 0.0024,
            scale: 0.0175,
        }
    }
}

/// Manipulator configuration parameters
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ArmParameters {
    /// Per joint bounds in degrees, one entry per joint
    pub limits: Vec<JointLimit>,
    /// Number of actuator channels in a velocity command
    pub channels: usize,
    /// Velocity magnitude sent while a joint moves
    pub speed: f64,
    /// Upper bound of the wait between two velocity commands, in milliseconds
    pub tick_ms: u64,
    pub conversion: Conversion,
    pub cancel_policy: CancelPolicy,
    /// Run the home script before every pick script
    pub home_before_script: bool,
    /// Robot identifier handed to the joint store
    pub robot_id: u32,
    /// Where the latest joint orientation is written, if anywhere
    pub store_path: Option<PathBuf>,
}

impl Default for ArmParameters {
    fn default() -> Self {
        Self {
            limits: vec![
                JointLimit::new(-140, 140),
                JointLimit::new(-20, 55),
                JointLimit::new(-30, 130),
                JointLimit::new(-120, 120),
            ],
            channels: 6,
            speed: 50.0,
            tick_ms: 20,
            conversion: Conversion::default(),
            cancel_policy: CancelPolicy::Skip,
            home_before_script: false,
            robot_id: 1,
            store_path: None,
        }
    }
}

impl ArmParameters {
    /// Load the parameters from `path` (if present) then `ARM__*` environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let params: Self = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("ARM").separator("__"))
            .build()
            .context("Cannot read configuration")?
            .try_deserialize()
            .context("Cannot parse configuration")?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let params: Self = toml::from_str(content).context("Cannot parse configuration")?;
        params.validate()?;
        Ok(params)
    }

    /// Write the parameters back as TOML
    pub fn update<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config = toml::to_string_pretty(self)?;
        std::fs::write(path, config).context("Cannot write configuration file")
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.is_empty() {
            bail!("At least one joint limit is required");
        }
        for (joint, limit) in self.limits.iter().enumerate() {
            if limit.min > limit.max {
                bail!("Joint {} limit is inverted: [{}, {}]", joint, limit.min, limit.max);
            }
        }
        if self.channels < self.limits.len() {
            bail!("{} channels cannot drive {} joints", self.channels, self.limits.len());
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            bail!("Speed must be a positive number");
        }
        if !(self.conversion.scale.is_finite() && self.conversion.scale > 0.0) {
            bail!("Conversion scale must be a positive number");
        }
        Ok(())
    }

    pub fn joint_count(&self) -> usize {
        self.limits.len()
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
