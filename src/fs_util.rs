use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::KiraError;

/// Immediate children of `dir`, sorted by path.
pub fn list_sorted(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, KiraError> {
    let entries = fs::read_dir(dir.as_std_path())
        .map_err(|err| KiraError::Filesystem(format!("read dir {dir}: {err}")))?;
    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| KiraError::Filesystem(err.to_string()))?;
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|path| KiraError::Filesystem(format!("non-utf8 path {}", path.display())))?;
        children.push(path);
    }
    children.sort();
    Ok(children)
}

pub fn subdirectories(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, KiraError> {
    let mut dirs = list_sorted(dir)?;
    dirs.retain(|path| {
        let keep = path.is_dir();
        if !keep {
            tracing::debug!(path = %path, "skipping non-directory entry");
        }
        keep
    });
    Ok(dirs)
}

pub fn files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, KiraError> {
    let mut files = list_sorted(dir)?;
    files.retain(|path| path.is_file());
    Ok(files)
}

pub fn file_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or_default()
}

/// Removes everything inside `dir` and keeps `dir` itself.
pub fn clear_dir(dir: &Utf8Path) -> Result<usize, KiraError> {
    let mut removed = 0;
    for path in list_sorted(dir)? {
        let meta = fs::symlink_metadata(path.as_std_path())
            .map_err(|err| KiraError::Filesystem(format!("stat {path}: {err}")))?;
        let result = if meta.is_dir() {
            fs::remove_dir_all(path.as_std_path())
        } else {
            fs::remove_file(path.as_std_path())
        };
        result.map_err(|err| KiraError::Filesystem(format!("failed to delete {path}: {err}")))?;
        removed += 1;
    }
    Ok(removed)
}
