// Jackson Coxson
// Synthetic container trees for tests

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{
    locator::{CONTAINER_METADATA, INFO_PLIST},
    log_sink::SinkEvent,
    ContainerRoots,
};

pub struct FakeDevice {
    pub dir: TempDir,
    pub roots: ContainerRoots,
}

impl FakeDevice {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let roots = ContainerRoots::new(
            dir.path().join("Bundle/Application"),
            dir.path().join("Data/Application"),
        );
        fs::create_dir_all(&roots.bundle_root).unwrap();
        fs::create_dir_all(&roots.data_root).unwrap();
        Self { dir, roots }
    }

    /// Adds `<bundle root>/<uuid>/<app_name>/Info.plist`
    pub fn add_bundle(&self, uuid: &str, app_name: &str, bundle_id: &str) -> PathBuf {
        let app = self.roots.bundle_root.join(uuid).join(app_name);
        fs::create_dir_all(&app).unwrap();
        write_plist(&app.join(INFO_PLIST), "CFBundleIdentifier", bundle_id);
        app
    }

    /// Adds `<data root>/<uuid>/.com.apple.mobile_container_manager.metadata.plist`
    pub fn add_data(&self, uuid: &str, bundle_id: &str) -> PathBuf {
        let container = self.roots.data_root.join(uuid);
        fs::create_dir_all(&container).unwrap();
        write_plist(
            &container.join(CONTAINER_METADATA),
            "MCMMetadataIdentifier",
            bundle_id,
        );
        container
    }

    pub fn source_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

pub fn write_plist(path: &Path, key: &str, value: &str) {
    let mut dict = plist::Dictionary::new();
    dict.insert(key.into(), value.into());
    dict.insert("MCMMetadataVersion".into(), plist::Value::from(6u64));
    plist::Value::Dictionary(dict).to_file_xml(path).unwrap();
}

/// Pulls every transcript message currently queued
pub fn messages(rx: &mut tokio::sync::mpsc::UnboundedReceiver<SinkEvent>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SinkEvent::Entry(entry) = event {
            out.push(entry.message);
        }
    }
    out
}
