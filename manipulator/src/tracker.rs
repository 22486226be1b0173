use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Snapshot {
    angles: Vec<i32>,
    generation: u64,
}

/// Last known angle of every joint, in degrees.
///
/// Feedback ingestion is the only writer. Readers get copies, so a snapshot
/// is always one complete feedback sample. Every update bumps a generation
/// counter and wakes the threads blocked in [`PositionTracker::wait_for_update`].
#[derive(Debug)]
pub struct PositionTracker {
    inner: Mutex<Snapshot>,
    updated: Condvar,
}

impl PositionTracker {
    pub fn new(joint_count: usize) -> Self {
        Self {
            inner: Mutex::new(Snapshot {
                angles: vec![0; joint_count],
                generation: 0,
            }),
            updated: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        // The snapshot is replaced in one assignment, a poisoned lock still holds a whole sample
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn update(&self, angles: Vec<i32>) {
        let mut snapshot = self.lock();
        snapshot.angles = angles;
        snapshot.generation = snapshot.generation.wrapping_add(1);
        drop(snapshot);
        self.updated.notify_all();
    }

    /// Latest angle of `joint`, 0 for a joint the tracker does not know
    pub fn current(&self, joint: usize) -> i32 {
        self.lock().angles.get(joint).copied().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<i32> {
        self.lock().angles.clone()
    }

    pub fn joint_count(&self) -> usize {
        self.lock().angles.len()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Block until the generation moves past `seen` or `timeout` elapses.
    ///
    /// Returns the generation observed on wake up.
    pub fn wait_for_update(&self, seen: u64, timeout: Duration) -> u64 {
        let deadline = Instant::now() + timeout;
        let mut snapshot = self.lock();
        while snapshot.generation == seen {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            snapshot = self
                .updated
                .wait_timeout(snapshot, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
        snapshot.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_at_zero() {
        let tracker = PositionTracker::new(4);
        assert_eq!(tracker.snapshot(), vec![0, 0, 0, 0]);
        assert_eq!(tracker.generation(), 0);
        assert_eq!(tracker.current(7), 0);
    }

    #[test]
    fn update_replaces_every_joint() {
        let tracker = PositionTracker::new(4);
        tracker.update(vec![1, -2, 3, -4]);
        assert_eq!(tracker.snapshot(), vec![1, -2, 3, -4]);
        assert_eq!(tracker.current(3), -4);
        assert_eq!(tracker.generation(), 1);
    }

    #[test]
    fn wait_times_out_without_update() {
        let tracker = PositionTracker::new(4);
        let start = Instant::now();
        assert_eq!(tracker.wait_for_update(0, Duration::from_millis(20)), 0);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wait_wakes_on_update() {
        let tracker = Arc::new(PositionTracker::new(4));
        let writer = {
            let tracker = tracker.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                tracker.update(vec![5, 5, 5, 5]);
            })
        };
        let generation = tracker.wait_for_update(0, Duration::from_secs(5));
        writer.join().unwrap();
        assert_eq!(generation, 1);
        assert_eq!(tracker.current(0), 5);
    }

    #[test]
    fn readers_never_see_partial_samples() {
        let tracker = Arc::new(PositionTracker::new(4));
        let writer = {
            let tracker = tracker.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    tracker.update(vec![i; 4]);
                }
            })
        };
        for _ in 0..1000 {
            let snapshot = tracker.snapshot();
            assert!(snapshot.iter().all(|angle| *angle == snapshot[0]));
        }
        writer.join().unwrap();
    }
}
