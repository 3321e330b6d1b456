// Jackson Coxson
// Puts the source file in place inside an application's data container

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use crate::{log_sink::LogSink, ReplacerError};

/// Where the replaced file lives, relative to the data container
pub const TARGET_SUBDIRECTORY: &str = "Documents/res/video";

/// Computes `<data_path>/Documents/res/video/<relative_file_name>`
pub fn target_path(data_path: &Path, relative_file_name: &str) -> PathBuf {
    data_path
        .join(TARGET_SUBDIRECTORY)
        .join(relative_file_name.trim_start_matches('/'))
}

/// Overwrites the target file with the source file
///
/// An existing target (file, directory or symlink) is deleted and then copied
/// over. Symlinks are unlinked, never written through. A missing target gets
/// its directory created (with intermediates) before the copy. Each step is
/// tried once, and a failed copy after a successful delete is not rolled back.
///
/// # Arguments
/// * `data_path` - The application's data container, must not be empty
/// * `relative_file_name` - File name under `Documents/res/video`
/// * `source_path` - The file whose contents are copied in
/// * `sink` - Receives progress and error lines
///
/// # Returns
/// `true` if the target now holds a copy of the source
pub fn replace(
    data_path: &Path,
    relative_file_name: &str,
    source_path: &Path,
    sink: &LogSink,
) -> bool {
    if data_path.as_os_str().is_empty() {
        sink.error("error: data path is empty, refusing to write");
        return false;
    }

    let target = target_path(data_path, relative_file_name);

    // A symlink at the target counts as present and gets unlinked, never followed
    if fs::symlink_metadata(&target).is_ok() {
        match overwrite(source_path, &target) {
            Ok(()) => {
                sink.info("replaced file successfully");
                true
            }
            Err(e) => {
                sink.error(format!("failed to replace file: {e}"));
                false
            }
        }
    } else {
        sink.info("target file not found under data path, trying to create it...");

        // `target` always has a parent, it was joined onto the data path
        let target_dir = target.parent().unwrap_or(data_path);
        if !target_dir.exists() {
            if let Err(e) = fs::create_dir_all(target_dir) {
                sink.error(format!(
                    "failed to create directory {}: {e}",
                    target_dir.display()
                ));
                return false;
            }
            sink.info(format!("created directory {}", target_dir.display()));
        }

        match copy_new(source_path, &target) {
            Ok(()) => {
                sink.info("created and copied file to data path successfully");
                true
            }
            Err(e) => {
                sink.error(format!("failed to copy file to data path: {e}"));
                false
            }
        }
    }
}

fn overwrite(source_path: &Path, target: &Path) -> Result<(), ReplacerError> {
    if fs::symlink_metadata(target)?.is_dir() {
        fs::remove_dir_all(target)?;
    } else {
        fs::remove_file(target)?;
    }
    copy_new(source_path, target)
}

/// Copies into a freshly created file, failing if anything appeared at `target`
fn copy_new(source_path: &Path, target: &Path) -> Result<(), ReplacerError> {
    let mut source = File::open(source_path)?;
    let mut target = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    io::copy(&mut source, &mut target)?;
    Ok(())
}
