use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1};
use thread_priority::{
    RealtimeThreadSchedulePolicy, ScheduleParams, ThreadBuilder, ThreadPriority, ThreadSchedulePolicy
};

use manipulator::cancel::CancellationFlag;
use manipulator::config::{ArmParameters, CONFIG_FILE};
use manipulator::controller::ArmController;
use manipulator::feedback::FeedbackIngest;
use manipulator::log::Logger;
use manipulator::remote::remote;
use manipulator::sim::SimulatedArm;
use manipulator::store::{FileStore, JointStore, NullStore};
use manipulator::tracker::PositionTracker;

fn main() -> Result<()> {
    let mut log_sink = Logger::init(LevelFilter::Trace);

    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let params = ArmParameters::load(&path)?;
    if Path::new(&path).exists() {
        log::info!("Loaded parameters from {}", path);
    } else if let Err(e) = params.update(&path) {
        log::warn!("{:#}", e);
    } else {
        log::info!("Wrote parameters to {}", path);
    }

    let store: Box<dyn JointStore> = match &params.store_path {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(NullStore),
    };
    let tracker = Arc::new(PositionTracker::new(params.joint_count()));
    let cancel = CancellationFlag::new();

    let (samples_tx, samples_rx) = channel();
    let (arm, _outputs) = SimulatedArm::with_channel(&params, tracker.snapshot(), samples_tx);
    let ingest = FeedbackIngest::new(&params, tracker.clone(), store);
    thread::Builder::new()
        .name("feedback".into())
        .spawn(move || ingest.run(samples_rx))
        .context("Cannot spawn feedback thread")?;

    let (mut controller, handle, reports) = ArmController::new(&params, tracker, cancel.clone(), Box::new(arm));
    ThreadBuilder::default()
        .name("controller")
        .policy(ThreadSchedulePolicy::Realtime(RealtimeThreadSchedulePolicy::Fifo))
        .priority(ThreadPriority::from_posix(ScheduleParams {
            sched_priority: 40,
        }))
        .spawn_careless(move || {
            if let Err(e) = controller.run() {
                log::error!("{:#}", e);
            }
        })
        .context("Cannot spawn controller thread")?;

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGUSR1, cancel.shared()).context("Cannot register SIGUSR1")?;
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, term.clone()).context("Cannot register termination signal")?;
    }

    let remote_handle = handle.clone();
    let remote_term = term.clone();
    let joint_count = params.joint_count();
    thread::Builder::new()
        .name("remote".into())
        .spawn(move || {
            if let Err(e) = remote(io::stdin().lock(), remote_handle, joint_count) {
                log::error!("{:#}", e);
            }
            remote_term.store(true, Ordering::Relaxed);
        })
        .context("Cannot spawn remote thread")?;

    while !term.load(Ordering::Relaxed) {
        for report in reports.try_iter() {
            log::debug!("{:?}", report);
        }
        log_sink.handle_logs();
        thread::sleep(Duration::from_millis(10));
    }

    handle.stop();
    log::info!("Shutting down");
    log_sink.handle_logs();
    Ok(())
}
