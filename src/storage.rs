//! App-managed storage directories.
//!
//! [`StorageManager`] is constructed explicitly and passed where needed;
//! there is no process-wide singleton. Provisioning the managed directories
//! happens once, in [`StorageManager::provision`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sysinfo::Disks;
use tracing::debug;

/// Directory layout and file helpers for app-managed storage.
#[derive(Debug, Clone)]
pub struct StorageManager {
    root: PathBuf,
    models_dir: PathBuf,
    knowledge_bases_dir: PathBuf,
    settings_dir: PathBuf,
}

impl StorageManager {
    /// Create the manager rooted at `root` and provision the managed
    /// directories (`models/`, `knowledge_bases/`, `settings/`), creating
    /// any that do not exist yet.
    pub fn provision(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let manager = Self {
            models_dir: root.join("models"),
            knowledge_bases_dir: root.join("knowledge_bases"),
            settings_dir: root.join("settings"),
            root,
        };
        for dir in [
            &manager.root,
            &manager.models_dir,
            &manager.knowledge_bases_dir,
            &manager.settings_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        debug!(root = %manager.root.display(), "storage provisioned");
        Ok(manager)
    }

    /// Platform per-user data directory for this application, if the
    /// platform exposes one.
    pub fn default_root() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ThothAI")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Root of all app-managed storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for model files.
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Directory for knowledge bases.
    pub fn knowledge_bases_dir(&self) -> &Path {
        &self.knowledge_bases_dir
    }

    /// Directory for app settings (catalog file included).
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// Best-effort free space on the volume holding the storage root, in
    /// bytes. `None` when it cannot be determined.
    pub fn free_space(&self) -> Option<u64> {
        let disks = Disks::new_with_refreshed_list();
        disks
            .iter()
            .filter(|disk| self.root.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| disk.available_space())
    }

    /// Free space as a human-readable string, or `"Unknown"`.
    pub fn free_space_string(&self) -> String {
        match self.free_space() {
            Some(bytes) => format_bytes(bytes),
            None => "Unknown".to_string(),
        }
    }
}

/// Write a file atomically: write to a sibling temp file, then rename over
/// the destination. The parent directory is created if needed.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("thoth");
        let storage = StorageManager::provision(&root).unwrap();

        assert!(storage.models_dir().is_dir());
        assert!(storage.knowledge_bases_dir().is_dir());
        assert!(storage.settings_dir().is_dir());

        // Provisioning again over an existing layout is a no-op.
        assert!(StorageManager::provision(&root).is_ok());
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_free_space_reports_something() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::provision(dir.path().join("thoth")).unwrap();
        // Value depends on the host; only the string contract is stable.
        let text = storage.free_space_string();
        assert!(!text.is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
