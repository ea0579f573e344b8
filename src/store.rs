use std::fs::{self, Permissions};
use std::io::Write;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tempfile::Builder;

use crate::correspondence::CORRESPONDENCE_FILE;
use crate::error::KiraError;
use crate::fs_util;

/// Layout of a destination repository (one chain, e.g. `.../AIRR-seq/Human/IGH`).
#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

impl Store {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn correspondence_path(&self) -> Utf8PathBuf {
        self.root.join(CORRESPONDENCE_FILE)
    }

    pub fn samples_root(&self) -> Utf8PathBuf {
        self.root.join("samples")
    }

    pub fn project_samples_dir(&self, project_number: &str) -> Utf8PathBuf {
        self.samples_root().join(project_number)
    }

    pub fn sample_dir(&self, project_number: &str, vdjbase_name: &str) -> Utf8PathBuf {
        self.project_samples_dir(project_number).join(vdjbase_name)
    }

    pub fn metadata_path(&self, project_number: &str, project_name: &str) -> Utf8PathBuf {
        self.root.join(format!("{project_number}_{project_name}.json"))
    }

    /// Empties `samples/<project_number>`. Returns `None` when the folder does not exist.
    pub fn clear_project_samples(&self, project_number: &str) -> Result<Option<usize>, KiraError> {
        let dir = self.project_samples_dir(project_number);
        if !dir.as_std_path().is_dir() {
            tracing::info!(path = %dir, "project directory does not exist yet, nothing to clear");
            return Ok(None);
        }
        let removed = fs_util::clear_dir(&dir)?;
        tracing::info!(path = %dir, removed, "project directory has been cleared");
        Ok(Some(removed))
    }

    pub fn read_json(path: &Path) -> Result<Value, KiraError> {
        let content = fs::read_to_string(path).map_err(|err| KiraError::MetadataRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|err| KiraError::MetadataRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Writes `value` as 4-space indented JSON through a temp file in the same
    /// directory, so `path` is either the old or the new document. An existing
    /// file keeps its permissions; a new one is created world-readable.
    pub fn write_json_atomic<T: Serialize>(path: &Utf8Path, value: &T) -> Result<(), KiraError> {
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or(Utf8Path::new("."));
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;

        let mut content = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut content, PrettyFormatter::with_indent(b"    "));
        value
            .serialize(&mut serializer)
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;

        let mut temp = Builder::new()
            .prefix("kira-vdjbase-json")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        temp.write_all(&content)
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        if let Some(permissions) = target_permissions(path)? {
            temp.as_file()
                .set_permissions(permissions)
                .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

fn target_permissions(path: &Utf8Path) -> Result<Option<Permissions>, KiraError> {
    match fs::metadata(path.as_std_path()) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(err) => Err(KiraError::Filesystem(format!("stat {path}: {err}"))),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
