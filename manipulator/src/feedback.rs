use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::config::{ArmParameters, Conversion};
use crate::error::{ArmError, Result};
use crate::store::JointStore;
use crate::tracker::PositionTracker;

/// Convert a raw joint position in radians to whole degrees
pub fn convert(conversion: &Conversion, raw: f64) -> Result<i32> {
    if !raw.is_finite() {
        return Err(ArmError::MalformedFeedback(format!("non finite position {}", raw)));
    }
    let degrees = ((raw - conversion.offset) / conversion.scale).round();
    if degrees < f64::from(i32::MIN) || degrees > f64::from(i32::MAX) {
        return Err(ArmError::MalformedFeedback(format!("position {} out of range", raw)));
    }
    Ok(degrees as i32)
}

/// Turns raw feedback samples into tracker updates
pub struct FeedbackIngest {
    tracker: Arc<PositionTracker>,
    conversion: Conversion,
    store: Box<dyn JointStore>,
    robot_id: u32,
}

impl FeedbackIngest {
    pub fn new(params: &ArmParameters, tracker: Arc<PositionTracker>, store: Box<dyn JointStore>) -> Self {
        Self {
            tracker,
            conversion: params.conversion,
            store,
            robot_id: params.robot_id,
        }
    }

    /// Convert a full sample and publish it.
    ///
    /// The tracker is left untouched when any value is rejected. A failing
    /// store is logged, never returned.
    pub fn ingest(&mut self, raw: &[f64]) -> Result<Vec<i32>> {
        let expected = self.tracker.joint_count();
        if raw.len() != expected {
            return Err(ArmError::MalformedFeedback(format!(
                "expected {} positions, got {}",
                expected,
                raw.len()
            )));
        }
        let angles = raw.iter().map(|value| convert(&self.conversion, *value)).collect::<Result<Vec<_>>>()?;

        self.tracker.update(angles.clone());
        if let Err(e) = self.store.store(self.robot_id, &angles) {
            log::warn!("Joint store failed: {:#}", e);
        }
        Ok(angles)
    }

    /// Feedback thread body: ingest samples until every sender is gone
    pub fn run(mut self, samples: Receiver<Vec<f64>>) {
        for sample in samples.iter() {
            if let Err(e) = self.ingest(&sample) {
                log::warn!("{}", e);
            }
        }
        log::debug!("Feedback channel closed");
    }
}
