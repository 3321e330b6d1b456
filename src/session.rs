// Jackson Coxson
//! Replacement requests and the worker that carries them out
//!
//! All filesystem work is blocking, so a request runs on tokio's blocking
//! pool while the caller keeps draining the transcript receiver. The
//! terminal outcome is posted on the same channel as the log lines, after
//! all of them.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::{
    access,
    locator::{self, ContainerRoots},
    log_sink::{LogSink, SinkEvent},
    replacer, ReplacerError,
};

pub const DEFAULT_BUNDLE_ID: &str = "com.netease.party";
pub const DEFAULT_FILE_NAME: &str = "login.mp4";

/// One user action: which app, which file, and what to put there
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementRequest {
    pub bundle_id: String,
    pub relative_file_name: String,
    pub source_path: PathBuf,
}

impl ReplacementRequest {
    pub fn new(
        bundle_id: impl Into<String>,
        relative_file_name: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            relative_file_name: relative_file_name.into(),
            source_path: source_path.into(),
        }
    }

    /// Checks the request before any filesystem work happens
    pub fn validate(&self) -> Result<(), ReplacerError> {
        if self.source_path.as_os_str().is_empty() {
            return Err(ReplacerError::PreconditionViolation(
                "no replacement file selected",
            ));
        }
        if self.bundle_id.is_empty() {
            return Err(ReplacerError::PreconditionViolation(
                "bundle id must not be empty",
            ));
        }
        Ok(())
    }
}

/// Locates the application and replaces the file, blocking the current thread
///
/// Only the data container has to be found. A missing bundle container is
/// logged and otherwise ignored.
pub fn run_replacement(
    roots: &ContainerRoots,
    request: &ReplacementRequest,
    sink: &LogSink,
) -> bool {
    if let Err(e) = request.validate() {
        sink.error(format!("error: {e}"));
        return false;
    }

    let paths = locator::locate(roots, &request.bundle_id, sink);
    if !paths.has_data() {
        sink.error(format!("error: {}", ReplacerError::NotFound));
        return false;
    }
    if !paths.has_bundle() {
        sink.warn("bundle path not found, continuing with the data path");
    }

    sink.info(format!("found path: {}", paths.data_path.display()));
    replacer::replace(
        &paths.data_path,
        &request.relative_file_name,
        &request.source_path,
        sink,
    )
}

/// Caller-side state for issuing replacements
///
/// The busy flag only stops this session from starting a second replacement
/// while one is running. Other sessions, or direct calls to
/// [`run_replacement`], are not excluded.
pub struct ReplacerSession {
    roots: ContainerRoots,
    sink: LogSink,
    busy: Arc<AtomicBool>,
}

impl ReplacerSession {
    /// Creates a session along with the receiver for its transcript
    pub fn new(roots: ContainerRoots) -> (Self, UnboundedReceiver<SinkEvent>) {
        let (sink, receiver) = LogSink::channel();
        (
            Self {
                roots,
                sink,
                busy: Arc::new(AtomicBool::new(false)),
            },
            receiver,
        )
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Probes whether the data container root can be read
    pub fn check_access(&self) -> bool {
        access::check_access(&self.roots, &self.sink)
    }

    /// Starts a replacement on the blocking pool
    ///
    /// Must be called from within a tokio runtime. Returns `None` without
    /// touching the filesystem if the request is invalid or a replacement is
    /// already running. Otherwise the handle resolves to the same outcome that
    /// is posted as [`SinkEvent::Finished`].
    pub fn spawn(&self, request: ReplacementRequest) -> Option<JoinHandle<bool>> {
        if let Err(e) = request.validate() {
            self.sink.error(format!("error: {e}"));
            return None;
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            self.sink.warn("a replacement is already running");
            return None;
        }

        self.sink.info("start replacing file...");

        let roots = self.roots.clone();
        let sink = self.sink.clone();
        let busy = self.busy.clone();
        Some(tokio::task::spawn_blocking(move || {
            let success = run_replacement(&roots, &request, &sink);

            if success {
                sink.info("file replacement complete");
            } else {
                sink.error("file replacement failed, see log");
            }
            sink.finish(success);
            // Cleared last so a follow-up run can't interleave with this result
            busy.store(false, Ordering::SeqCst);
            success
        }))
    }
}
