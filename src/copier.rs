use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::classifier::AnnotatedResult;
use crate::correspondence::RepertoireMapping;
use crate::domain::RepertoireDetails;
use crate::error::KiraError;
use crate::fs_util;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedFile {
    pub vdjbase_name: String,
    pub source: Utf8PathBuf,
    pub destination: Utf8PathBuf,
}

/// Copies content, permissions and access/modification times of `source`.
/// Nothing is written when `source` is not a regular file.
pub fn copy_file(source: &Path, destination: &Path) -> Result<(), KiraError> {
    if !source.is_file() {
        return Err(KiraError::SourceNotFound(source.to_path_buf()));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|err| KiraError::Filesystem(err.to_string()))?;
    }

    let metadata = fs::metadata(source)
        .map_err(|err| KiraError::Filesystem(format!("stat {}: {err}", source.display())))?;
    let mut reader = File::open(source)
        .map_err(|err| KiraError::Filesystem(format!("open {}: {err}", source.display())))?;
    let mut writer = File::create(destination).map_err(|err| {
        KiraError::Filesystem(format!("create {}: {err}", destination.display()))
    })?;
    io::copy(&mut reader, &mut writer).map_err(|err| KiraError::Filesystem(err.to_string()))?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    writer
        .set_times(times)
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;
    writer
        .set_permissions(metadata.permissions())
        .map_err(|err| KiraError::Filesystem(err.to_string()))?;

    tracing::debug!(
        "file copied from {} to {}",
        source.display(),
        destination.display()
    );
    Ok(())
}

/// Populates `samples/<project_number>/<vdjbase_name>/` for every mapping entry
/// with the required files of the annotated results sharing its repertoire id.
pub fn copy_required_files(
    mapping: &RepertoireMapping,
    annotated: &[AnnotatedResult],
    store: &Store,
) -> Result<Vec<CopiedFile>, KiraError> {
    let identified = annotated
        .iter()
        .map(|result| {
            RepertoireDetails::load(result.repertoire_ids.as_std_path())
                .map(|details| (details.repertoire_id, result))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut copied = Vec::new();
    for entry in mapping.iter() {
        let sample_dir = store.sample_dir(&entry.project_number, &entry.vdjbase_name);
        fs::create_dir_all(sample_dir.as_std_path())
            .map_err(|err| KiraError::Filesystem(err.to_string()))?;

        for (repertoire_id, result) in &identified {
            if *repertoire_id != entry.airr_repertoire_id {
                continue;
            }
            for source in &result.required_files {
                let destination = sample_dir.join(fs_util::file_name(source));
                copy_file(source.as_std_path(), destination.as_std_path())?;
                copied.push(CopiedFile {
                    vdjbase_name: entry.vdjbase_name.clone(),
                    source: source.clone(),
                    destination,
                });
            }
        }
    }

    tracing::info!(files = copied.len(), "required files copied");
    Ok(copied)
}
