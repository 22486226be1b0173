use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Records kept in flight before new ones are dropped
const BACKLOG: usize = 64;

struct SyncRecord {
    timestamp: Instant,
    level: Level,
    target: String,
    content: String,
}

/// Printing end of the [`Logger`], owned by the main thread
pub struct LogSink {
    receiver: Receiver<SyncRecord>,
    start: Instant,
}

/// `log` backend that never blocks the control threads: records are
/// queued with `try_send` and printed later by [`LogSink::handle_logs`]
pub struct Logger {
    sender: SyncSender<SyncRecord>,
    level: LevelFilter,
}

impl Logger {
    pub fn init(level: LevelFilter) -> LogSink {
        let (logger, sink) = Self::new(level);
        let _ = log::set_logger(Box::leak(Box::new(logger))).map(|()| log::set_max_level(level));
        sink
    }

    fn new(level: LevelFilter) -> (Self, LogSink) {
        let (sender, receiver) = sync_channel(BACKLOG);
        let logger = Self {
            sender,
            level,
        };
        let sink = LogSink {
            receiver,
            start: Instant::now(),
        };
        (logger, sink)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = self.sender.try_send(SyncRecord {
                timestamp: Instant::now(),
                level: record.level(),
                target: record.target().trim_start_matches("manipulator::").to_string(),
                content: std::fmt::format(*record.args()),
            });
        }
    }

    fn flush(&self) {}
}

impl LogSink {
    fn format(&self, record: &SyncRecord) -> String {
        format!(
            "[{:<9.5}] {:<5} {}: {}",
            record.timestamp.duration_since(self.start).as_secs_f32(),
            record.level,
            record.target,
            record.content
        )
    }

    /// Print every pending record
    pub fn handle_logs(&mut self) {
        for record in self.receiver.try_iter() {
            println!("{}", self.format(&record));
        }
    }
}
