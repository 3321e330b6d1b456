// Jackson Coxson
// Checks whether the container roots can be read at all

use std::fs;

use crate::{locator::ContainerRoots, log_sink::LogSink};

/// Probes the data container root
///
/// Without the platform entitlements the root can't be listed and every
/// replacement would fail, so callers check this up front.
pub fn check_access(roots: &ContainerRoots, sink: &LogSink) -> bool {
    let accessible = match fs::read_dir(&roots.data_root) {
        Ok(_) => {
            sink.info(format!("accessible: {}", roots.data_root.display()));
            true
        }
        Err(e) => {
            sink.warn(format!(
                "not accessible: {} ({e})",
                roots.data_root.display()
            ));
            false
        }
    };

    if accessible {
        sink.info("permissions ok");
    } else {
        sink.warn("no access permission, install with the required entitlements");
    }
    accessible
}
