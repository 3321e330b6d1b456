// Jackson Coxson
//! Locates an installed application's sandbox by bundle identifier and
//! overwrites a single file inside it.
//!
//! The flow is split in two steps. [`locator::locate`] scans the bundle and
//! data container roots for the application, then [`replacer::replace`] puts
//! the source file in place under the data container. Both report progress
//! through a [`log_sink::LogSink`] and fold failures into a plain `bool`.

pub mod access;
pub mod locator;
pub mod log_sink;
pub mod replacer;
pub mod session;

#[cfg(test)]
mod fixtures;

pub use access::check_access;
pub use locator::{locate, ApplicationPaths, ContainerRoots};
pub use log_sink::{LogEntry, LogSink, SinkEvent};
pub use replacer::replace;
pub use session::{run_replacement, ReplacementRequest, ReplacerSession};

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplacerError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("io on plist: {0}")]
    Plist(#[from] plist::Error),
    #[error("metadata has no identifier")]
    MissingIdentifier,
    #[error("application not found, check the bundle id")]
    NotFound,
    #[error("{0}")]
    PreconditionViolation(&'static str),
}
