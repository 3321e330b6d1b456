// Jackson Coxson
//! Application container lookup
//!
//! Installed apps live in two trees, each with one UUID-named directory per
//! app. The bundle tree holds the read-only `.app` with its `Info.plist`, the
//! data tree holds the sandbox with a hidden container manager metadata
//! plist. Neither UUID is derivable from the bundle identifier, so both trees
//! are scanned linearly and the first match wins.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;

use crate::{log_sink::LogSink, ReplacerError};

pub const BUNDLE_CONTAINER_ROOT: &str = "/var/containers/Bundle/Application";
pub const DATA_CONTAINER_ROOT: &str = "/var/mobile/Containers/Data/Application";

pub(crate) const APP_SUFFIX: &str = ".app";
pub(crate) const INFO_PLIST: &str = "Info.plist";
pub(crate) const CONTAINER_METADATA: &str = ".com.apple.mobile_container_manager.metadata.plist";

/// The two directories scanned for containers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRoots {
    pub bundle_root: PathBuf,
    pub data_root: PathBuf,
}

impl ContainerRoots {
    pub fn new(bundle_root: impl Into<PathBuf>, data_root: impl Into<PathBuf>) -> Self {
        Self {
            bundle_root: bundle_root.into(),
            data_root: data_root.into(),
        }
    }
}

impl Default for ContainerRoots {
    fn default() -> Self {
        Self::new(BUNDLE_CONTAINER_ROOT, DATA_CONTAINER_ROOT)
    }
}

/// Resolved container paths for one application
///
/// A path that wasn't found is left empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplicationPaths {
    /// The `.app` directory inside the bundle container
    pub bundle_path: PathBuf,
    /// The sandboxed data directory
    pub data_path: PathBuf,
}

impl ApplicationPaths {
    pub fn has_bundle(&self) -> bool {
        !self.bundle_path.as_os_str().is_empty()
    }

    pub fn has_data(&self) -> bool {
        !self.data_path.as_os_str().is_empty()
    }
}

#[derive(Deserialize, Debug)]
struct InfoPlist {
    #[serde(rename = "CFBundleIdentifier")]
    bundle_identifier: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ContainerMetadata {
    #[serde(rename = "MCMMetadataIdentifier")]
    identifier: Option<String>,
}

/// Finds the bundle and data containers of an installed application
///
/// # Arguments
/// * `roots` - The container roots to scan
/// * `bundle_id` - The exact bundle identifier to look for
/// * `sink` - Receives an error line if a root itself can't be listed
///
/// Candidates whose listing or metadata can't be read are skipped. Nothing is
/// cached, every call rescans both trees.
pub fn locate(roots: &ContainerRoots, bundle_id: &str, sink: &LogSink) -> ApplicationPaths {
    let bundle_path = match find_bundle(&roots.bundle_root, bundle_id) {
        Ok(p) => p.unwrap_or_default(),
        Err(e) => {
            sink.error(format!("error while looking up bundle path: {e}"));
            PathBuf::new()
        }
    };

    let data_path = match find_data_container(&roots.data_root, bundle_id) {
        Ok(p) => p.unwrap_or_default(),
        Err(e) => {
            sink.error(format!("error while looking up data path: {e}"));
            PathBuf::new()
        }
    };

    ApplicationPaths {
        bundle_path,
        data_path,
    }
}

fn find_bundle(root: &Path, bundle_id: &str) -> Result<Option<PathBuf>, ReplacerError> {
    Ok(fs::read_dir(root)?
        .filter_map(Result::ok)
        .flat_map(|container| app_bundles(container.path()))
        .find(|app| {
            let info = app.join(INFO_PLIST);
            identifier_matches(bundle_identifier(&info), &info, bundle_id)
        }))
}

fn find_data_container(root: &Path, bundle_id: &str) -> Result<Option<PathBuf>, ReplacerError> {
    Ok(fs::read_dir(root)?
        .filter_map(Result::ok)
        .map(|container| container.path())
        .find(|container| {
            let metadata = container.join(CONTAINER_METADATA);
            identifier_matches(metadata_identifier(&metadata), &metadata, bundle_id)
        }))
}

/// Lazily yields the `.app` entries directly inside a bundle container
fn app_bundles(container: PathBuf) -> impl Iterator<Item = PathBuf> {
    let entries = match fs::read_dir(&container) {
        Ok(entries) => Some(entries),
        Err(e) => {
            debug!("Skipping bundle container {}: {e}", container.display());
            None
        }
    };

    entries
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(APP_SUFFIX))
        .map(|entry| entry.path())
}

fn bundle_identifier(info_plist: &Path) -> Result<String, ReplacerError> {
    let info: InfoPlist = plist::from_file(info_plist)?;
    info.bundle_identifier.ok_or(ReplacerError::MissingIdentifier)
}

fn metadata_identifier(metadata: &Path) -> Result<String, ReplacerError> {
    let metadata: ContainerMetadata = plist::from_file(metadata)?;
    metadata.identifier.ok_or(ReplacerError::MissingIdentifier)
}

fn identifier_matches(
    identifier: Result<String, ReplacerError>,
    source: &Path,
    bundle_id: &str,
) -> bool {
    match identifier {
        Ok(identifier) => identifier == bundle_id,
        Err(e) => {
            debug!("Skipping {}: {e}", source.display());
            false
        }
    }
}
