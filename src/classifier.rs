//! Classification of a single result folder (`<run>/<result>/`).
//!
//! A result folder holds a handful of subfolders. Files are matched by name
//! fragments from [`ScanMarkers`]; metadata files are only picked up from
//! subfolders whose name contains the metadata folder marker.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::config::ScanMarkers;
use crate::error::KiraError;
use crate::fs_util;

pub const ANNOTATION_METADATA_FILE: &str = "annotation_metadata.json";
pub const PRE_PROCESSED_METADATA_FILE: &str = "pre_processed_metadata.json";
pub const REPERTOIRE_ID_FILE: &str = "repertoire_id.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    Annotated,
    PreProcessed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedResult {
    pub file_path: Utf8PathBuf,
    pub file_name: String,
    pub repertoire_ids: Utf8PathBuf,
    pub annotation_metadata: Utf8PathBuf,
    pub required_files: Vec<Utf8PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreProcessedResult {
    pub repertoire_ids: Utf8PathBuf,
    pub pre_processed_metadata: Utf8PathBuf,
}

/// A field that could not be located inside a result folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
    pub result_path: Utf8PathBuf,
    pub mode: ResultMode,
    pub field: &'static str,
}

#[derive(Debug, Clone)]
pub struct Classified<T> {
    pub result: Option<T>,
    pub issues: Vec<ScanIssue>,
}

pub fn classify_annotated(
    result_path: &Utf8Path,
    markers: &ScanMarkers,
) -> Result<Classified<AnnotatedResult>, KiraError> {
    let mut primary: Option<Utf8PathBuf> = None;
    let mut repertoire_ids = None;
    let mut annotation_metadata = None;
    let mut required_files = Vec::new();

    for folder in fs_util::subdirectories(result_path)? {
        let files = fs_util::files(&folder)?;
        for file in &files {
            let name = fs_util::file_name(file);
            // Sorted listing, so the last match is the greatest path.
            if name.contains(&markers.primary_file) {
                primary = Some(file.clone());
            }
            if markers
                .required_files
                .iter()
                .any(|marker| name.contains(marker.as_str()))
            {
                required_files.push(file.clone());
            }
        }

        if is_metadata_folder(&folder, markers) {
            if let Some(path) = find_named(&files, ANNOTATION_METADATA_FILE) {
                annotation_metadata = Some(path);
            }
            if let Some(path) = find_named(&files, REPERTOIRE_ID_FILE) {
                repertoire_ids = Some(path);
            }
        }
    }

    let mut issues = Vec::new();
    let mode = ResultMode::Annotated;
    note_missing(&mut issues, result_path, mode, "file_path", primary.is_none());
    note_missing(
        &mut issues,
        result_path,
        mode,
        "repertoire_ids",
        repertoire_ids.is_none(),
    );
    note_missing(
        &mut issues,
        result_path,
        mode,
        "annotation_metadata",
        annotation_metadata.is_none(),
    );

    let result = match (primary, repertoire_ids, annotation_metadata) {
        (Some(file_path), Some(repertoire_ids), Some(annotation_metadata)) => {
            let file_name = fs_util::file_name(&file_path).to_string();
            Some(AnnotatedResult {
                file_path,
                file_name,
                repertoire_ids,
                annotation_metadata,
                required_files,
            })
        }
        _ => None,
    };

    Ok(Classified { result, issues })
}

pub fn classify_pre_processed(
    result_path: &Utf8Path,
    markers: &ScanMarkers,
) -> Result<Classified<PreProcessedResult>, KiraError> {
    let mut repertoire_ids = None;
    let mut pre_processed_metadata = None;

    for folder in fs_util::subdirectories(result_path)? {
        if !is_metadata_folder(&folder, markers) {
            continue;
        }
        let files = fs_util::files(&folder)?;
        if let Some(path) = find_named(&files, PRE_PROCESSED_METADATA_FILE) {
            pre_processed_metadata = Some(path);
        }
        if let Some(path) = find_named(&files, REPERTOIRE_ID_FILE) {
            repertoire_ids = Some(path);
        }
    }

    let mut issues = Vec::new();
    let mode = ResultMode::PreProcessed;
    note_missing(
        &mut issues,
        result_path,
        mode,
        "repertoire_ids",
        repertoire_ids.is_none(),
    );
    note_missing(
        &mut issues,
        result_path,
        mode,
        "pre_processed_metadata",
        pre_processed_metadata.is_none(),
    );

    let result = match (repertoire_ids, pre_processed_metadata) {
        (Some(repertoire_ids), Some(pre_processed_metadata)) => Some(PreProcessedResult {
            repertoire_ids,
            pre_processed_metadata,
        }),
        _ => None,
    };

    Ok(Classified { result, issues })
}

fn is_metadata_folder(folder: &Utf8Path, markers: &ScanMarkers) -> bool {
    fs_util::file_name(folder).contains(&markers.metadata_folder)
}

fn find_named(files: &[Utf8PathBuf], name: &str) -> Option<Utf8PathBuf> {
    files
        .iter()
        .find(|file| fs_util::file_name(file) == name)
        .cloned()
}

fn note_missing(
    issues: &mut Vec<ScanIssue>,
    result_path: &Utf8Path,
    mode: ResultMode,
    field: &'static str,
    missing: bool,
) {
    if missing {
        tracing::warn!("{field} was not found in the {result_path}");
        issues.push(ScanIssue {
            result_path: result_path.to_path_buf(),
            mode,
            field,
        });
    }
}
