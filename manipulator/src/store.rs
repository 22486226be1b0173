use std::path::PathBuf;

use anyhow::{Context, Result};

/// Persistence collaborator for joint orientation.
///
/// Called after every tracker update. Failures are reported to the caller,
/// which logs them and carries on.
pub trait JointStore: Send {
    fn store(&mut self, robot_id: u32, angles: &[i32]) -> Result<()>;
}

/// Drops every sample
#[derive(Debug, Default)]
pub struct NullStore;

impl JointStore for NullStore {
    fn store(&mut self, _robot_id: u32, _angles: &[i32]) -> Result<()> {
        Ok(())
    }
}

/// Keeps the latest orientation as a `"<robot_id> a,b,c,d"` line in a file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
        }
    }
}

pub fn orientation(angles: &[i32]) -> String {
    angles.iter().map(i32::to_string).collect::<Vec<_>>().join(",")
}

impl JointStore for FileStore {
    fn store(&mut self, robot_id: u32, angles: &[i32]) -> Result<()> {
        let line = format!("{} {}\n", robot_id, orientation(angles));
        std::fs::write(&self.path, line)
            .with_context(|| format!("Cannot write joint orientation to {}", self.path.display()))
    }
}
