use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::classifier::{self, AnnotatedResult, PreProcessedResult, ScanIssue};
use crate::config::ScanMarkers;
use crate::error::KiraError;
use crate::fs_util;

pub const ANNOTATED_DIR: &str = "annotated";
pub const PRE_PROCESSED_DIR: &str = "pre_processed";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub annotated: Vec<AnnotatedResult>,
    pub pre_processed: Vec<PreProcessedResult>,
    pub issues: Vec<ScanIssue>,
}

/// Scans `<source>/annotated` (required) and `<source>/pre_processed` (optional).
pub fn scan_project(source: &Utf8Path, markers: &ScanMarkers) -> Result<ScanReport, KiraError> {
    let annotated_root = source.join(ANNOTATED_DIR);
    if !annotated_root.as_std_path().is_dir() {
        return Err(KiraError::MissingAnnotatedTree(
            annotated_root.into_std_path_buf(),
        ));
    }

    let mut report = ScanReport::default();
    for result_path in result_folders(&annotated_root)? {
        let classified = classifier::classify_annotated(&result_path, markers)?;
        report.issues.extend(classified.issues);
        report.annotated.extend(classified.result);
    }

    let pre_processed_root = source.join(PRE_PROCESSED_DIR);
    if pre_processed_root.as_std_path().is_dir() {
        for result_path in result_folders(&pre_processed_root)? {
            let classified = classifier::classify_pre_processed(&result_path, markers)?;
            report.issues.extend(classified.issues);
            report.pre_processed.extend(classified.result);
        }
    } else {
        tracing::debug!(path = %pre_processed_root, "no pre_processed folder");
    }

    tracing::info!(
        annotated = report.annotated.len(),
        pre_processed = report.pre_processed.len(),
        issues = report.issues.len(),
        "scan finished"
    );
    Ok(report)
}

/// `<root>/<subject>/<sample>/<run>/<result>` folders in sorted order.
pub fn result_folders(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, KiraError> {
    let mut results = Vec::new();
    for subject in fs_util::subdirectories(root)? {
        for sample in fs_util::subdirectories(&subject)? {
            for run in fs_util::subdirectories(&sample)? {
                results.extend(fs_util::subdirectories(&run)?);
            }
        }
    }
    Ok(results)
}
