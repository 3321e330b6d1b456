// Jackson Coxson
// Timestamped transcript shared between the worker and whoever displays it

use std::fmt;

use chrono::{Local, NaiveTime};
use log::{error, info, trace, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A single line of the transcript
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Local wall clock time, second precision
    pub timestamp: NaiveTime,
    pub message: String,
}

impl LogEntry {
    /// Stamps a message with the current local time
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().time(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Everything the consumer side of a [`LogSink`] receives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    Entry(LogEntry),
    /// Terminal outcome of a replacement, always the last event of that run
    Finished(bool),
}

/// Producer half of the transcript
///
/// Cheap to clone and safe to hand to blocking workers. Entries are delivered
/// to the single receiver in the order they were emitted. Every entry is also
/// mirrored to the `log` facade so `RUST_LOG` shows the same transcript.
#[derive(Clone, Debug)]
pub struct LogSink {
    sender: UnboundedSender<SinkEvent>,
}

impl LogSink {
    /// Creates a sink along with the receiver that owns the displayed transcript
    pub fn channel() -> (Self, UnboundedReceiver<SinkEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.push(message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.push(message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{message}");
        self.push(message);
    }

    /// Posts the terminal outcome of a replacement
    pub fn finish(&self, success: bool) {
        self.send(SinkEvent::Finished(success));
    }

    fn push(&self, message: String) {
        self.send(SinkEvent::Entry(LogEntry::now(message)));
    }

    fn send(&self, event: SinkEvent) {
        // The consumer going away isn't a reason to stop the worker
        if self.sender.send(event).is_err() {
            trace!("Transcript receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_renders_zero_padded_time() {
        let entry = LogEntry {
            timestamp: NaiveTime::from_hms_opt(9, 5, 3).unwrap(),
            message: "created directory".to_string(),
        };
        assert_eq!(entry.to_string(), "[09:05:03] created directory");
    }

    #[test]
    fn entry_has_no_sub_second_part() {
        let entry = LogEntry::now("x");
        let rendered = entry.to_string();
        // "[HH:MM:SS] x"
        assert_eq!(rendered.len(), 12);
        assert_eq!(&rendered[3..4], ":");
        assert_eq!(&rendered[6..7], ":");
    }

    #[test]
    fn events_arrive_in_emission_order() {
        let (sink, mut rx) = LogSink::channel();
        let worker = sink.clone();
        std::thread::spawn(move || {
            worker.info("one");
            worker.warn("two");
            worker.error("three");
            worker.finish(false);
        })
        .join()
        .unwrap();

        let mut messages = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                SinkEvent::Entry(e) => messages.push(e.message),
                SinkEvent::Finished(ok) => messages.push(format!("finished {ok}")),
            }
        }
        assert_eq!(messages, ["one", "two", "three", "finished false"]);
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (sink, rx) = LogSink::channel();
        drop(rx);
        sink.info("nobody is listening");
        sink.finish(true);
    }
}
