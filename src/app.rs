use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use walkdir::WalkDir;

use crate::classifier::ScanIssue;
use crate::config::ResolvedConfig;
use crate::copier::{self, CopiedFile};
use crate::correspondence::CorrespondenceTable;
use crate::error::KiraError;
use crate::merge::{MergeReport, ProjectMetadata};
use crate::scanner::{self, ANNOTATED_DIR};
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub project_name: String,
    pub project_number: String,
    pub metadata_path: Utf8PathBuf,
    pub repertoires: usize,
    pub cleared_entries: Option<usize>,
    pub annotated_results: usize,
    pub pre_processed_results: usize,
    pub merge: MergeReport,
    pub copied: Vec<CopiedFile>,
    pub issues: Vec<ScanIssue>,
    pub completed_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// One import of a project from the sequence data store into a destination repo.
#[derive(Debug, Clone)]
pub struct App {
    config: ResolvedConfig,
    store: Store,
}

impl App {
    pub fn new(config: ResolvedConfig) -> Self {
        let store = Store::new(config.dest_root.clone());
        Self { config, store }
    }

    pub fn run(&self, sink: &dyn ProgressSink) -> Result<IngestReport, KiraError> {
        let start = Instant::now();
        let config = &self.config;
        let project_name = config.project_name.as_str();

        sink.event(ProgressEvent {
            message: "phase=Verify; checking source and destination".to_string(),
            elapsed: None,
        });
        verify_directory_exists(&config.source_root)?;
        verify_directory_exists(&config.dest_root)?;

        let correspondence_path = self.store.correspondence_path();
        let table = CorrespondenceTable::load(correspondence_path.as_std_path())?;
        let mapping = table.derive_mapping(project_name)?;
        let project_number = mapping
            .first()
            .map(|entry| entry.project_number.clone())
            .ok_or_else(|| KiraError::NoMatchingProject(project_name.to_string()))?;
        tracing::info!(
            project = project_name,
            project_number = %project_number,
            repertoires = mapping.len(),
            "derived repertoire mapping"
        );

        sink.event(ProgressEvent {
            message: format!("phase=Store; clearing samples/{project_number}"),
            elapsed: Some(start.elapsed()),
        });
        let cleared_entries = self.store.clear_project_samples(&project_number)?;

        sink.event(ProgressEvent {
            message: "phase=Verify; checking final annotations".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let expected = table.expected_repertoire_ids(project_name)?;
        verify_annotations_exist(
            &config.source_root.join(ANNOTATED_DIR),
            &expected,
            &config.final_annotation_marker,
        )?;

        sink.event(ProgressEvent {
            message: "phase=Scan; scanning annotated and pre_processed trees".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let scan = scanner::scan_project(&config.source_root, &config.markers)?;

        sink.event(ProgressEvent {
            message: "phase=Merge; merging repertoire metadata".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let mut metadata = ProjectMetadata::load(config.project_metadata.as_std_path())?;
        let merge = metadata.merge_results(&scan.annotated, &scan.pre_processed, config.unmatched)?;
        let metadata_path = self.store.metadata_path(&project_number, project_name);
        Store::write_json_atomic(&metadata_path, metadata.as_value())?;
        tracing::info!(path = %metadata_path, applied = merge.applied, "project metadata written");

        sink.event(ProgressEvent {
            message: "phase=Copy; copying required files".to_string(),
            elapsed: Some(start.elapsed()),
        });
        let copied = copier::copy_required_files(&mapping, &scan.annotated, &self.store)?;

        sink.event(ProgressEvent {
            message: "phase=Done; data copy completed successfully".to_string(),
            elapsed: Some(start.elapsed()),
        });

        Ok(IngestReport {
            project_name: project_name.to_string(),
            project_number,
            metadata_path,
            repertoires: mapping.len(),
            cleared_entries,
            annotated_results: scan.annotated.len(),
            pre_processed_results: scan.pre_processed.len(),
            merge,
            copied,
            issues: scan.issues,
            completed_at: iso_timestamp(),
        })
    }
}

pub fn verify_directory_exists(path: &Utf8Path) -> Result<(), KiraError> {
    if !path.as_std_path().is_dir() {
        return Err(KiraError::MissingDirectory(path.as_std_path().to_path_buf()));
    }
    Ok(())
}

/// Every expected repertoire id must appear in the name of at least one file
/// under `annotated_root` whose name contains `marker`. Unreadable folders are
/// logged and skipped.
pub fn verify_annotations_exist(
    annotated_root: &Utf8Path,
    expected: &[String],
    marker: &str,
) -> Result<(), KiraError> {
    if !annotated_root.as_std_path().is_dir() {
        return Err(KiraError::MissingAnnotatedTree(
            annotated_root.as_std_path().to_path_buf(),
        ));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(annotated_root.as_std_path()).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry under annotated");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.contains(marker) {
            found.push(name.into_owned());
        }
    }

    let missing = expected
        .iter()
        .filter(|id| !found.iter().any(|name| name.contains(id.as_str())))
        .cloned()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(KiraError::MissingAnnotations(missing));
    }
    Ok(())
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
