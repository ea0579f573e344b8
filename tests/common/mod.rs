#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use tempfile::TempDir;

use kira_vdjbase_ingest::config::{ResolvedConfig, ScanMarkers};
use kira_vdjbase_ingest::domain::UnmatchedPolicy;

pub const PROJECT: &str = "PRJNA248411";

pub const CORRESPONDENCE: &str = "\
airr_file,vdjbase_name,airr_repertoire_id
PRJNA248411/SRR1.fastq,P1_I1_S1,REP1
PRJNA248411/SRR2.fastq,P1_I2_S1,REP2
PRJNA000001/SRR9.fastq,P7_I1_S1,OTHER
";

pub struct Fixture {
    pub temp: TempDir,
    pub source: Utf8PathBuf,
    pub dest: Utf8PathBuf,
    pub project_metadata: Utf8PathBuf,
}

pub fn utf8(path: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
}

pub fn write(path: &Utf8Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap().as_std_path()).unwrap();
    fs::write(path.as_std_path(), content).unwrap();
}

pub fn write_json(path: &Utf8Path, value: &Value) {
    write(path, &serde_json::to_string_pretty(value).unwrap());
}

pub fn repertoire_ids(repertoire_id: &str) -> Value {
    json!({
        "repertoire_id": repertoire_id,
        "subject_id": format!("{repertoire_id}-subject"),
        "sample_id": format!("{repertoire_id}-sample"),
    })
}

/// `<annotated>/<subject>/<sample>/<run>/<result>` for one repertoire.
pub fn annotated_result(source: &Utf8Path, repertoire_id: &str) -> Utf8PathBuf {
    source
        .join("annotated")
        .join(format!("SUBJ_{repertoire_id}"))
        .join("SAMPLE1")
        .join("RUN1")
        .join("airrseq_result")
}

pub fn pre_processed_result(source: &Utf8Path, repertoire_id: &str) -> Utf8PathBuf {
    source
        .join("pre_processed")
        .join(format!("SUBJ_{repertoire_id}"))
        .join("SAMPLE1")
        .join("RUN1")
        .join("presto_result")
}

pub fn add_annotated(source: &Utf8Path, repertoire_id: &str) {
    let result = annotated_result(source, repertoire_id);
    write_json(
        &result.join("meta_data").join("repertoire_id.json"),
        &repertoire_ids(repertoire_id),
    );
    write_json(
        &result.join("meta_data").join("annotation_metadata.json"),
        &json!({
            "sample": {
                "data_processing": {
                    "software_versions": ["igblast-1.22"],
                    "germline_database": "IMGT-2024"
                }
            }
        }),
    );
    let reports = result.join("reports");
    write(&reports.join(format!("{repertoire_id}_Finale.tsv")), "seq\n");
    write(&reports.join(format!("{repertoire_id}_haplotype.tsv")), "hap\n");
    write(&reports.join(format!("{repertoire_id}_genotype.tsv")), "geno\n");
    write(&reports.join("ogrdb_report.csv"), "report\n");
    write(&reports.join("unrelated.log"), "log\n");
}

pub fn add_pre_processed(source: &Utf8Path, repertoire_id: &str) {
    let result = pre_processed_result(source, repertoire_id);
    write_json(
        &result.join("meta_data").join("repertoire_id.json"),
        &repertoire_ids(repertoire_id),
    );
    write_json(
        &result.join("meta_data").join("pre_processed_metadata.json"),
        &json!({
            "sample": {
                "data_processing": {
                    "software_versions": ["presto-0.7"],
                    "primer_set": "BIOMED-2"
                }
            }
        }),
    );
}

pub fn project_metadata_document() -> Value {
    json!({
        "Repertoire": [
            {
                "repertoire_id": "REP1",
                "data_processing": [{"data_processing_id": "1", "software_versions": ["fastqc"]}]
            },
            {
                "repertoire_id": "REP2",
                "data_processing": [{"data_processing_id": "2", "software_versions": ["fastqc"]}]
            }
        ]
    })
}

/// Data store project `PRJNA248411/runs/current` with two repertoires and a
/// destination repo carrying the correspondence table.
pub fn fixture() -> Fixture {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8(temp.path());
    let project_dir = root.join("store").join(PROJECT);
    let source = project_dir.join("runs").join("current");
    let dest = root.join("digby").join("AIRR-seq").join("Human").join("IGH");
    let project_metadata = project_dir.join("project_metadata").join("metadata.json");

    for id in ["REP1", "REP2"] {
        add_annotated(&source, id);
        add_pre_processed(&source, id);
    }
    write_json(&project_metadata, &project_metadata_document());
    write(&dest.join("airr_correspondence.csv"), CORRESPONDENCE);

    Fixture {
        temp,
        source,
        dest,
        project_metadata,
    }
}

impl Fixture {
    pub fn config(&self) -> ResolvedConfig {
        ResolvedConfig {
            project_name: PROJECT.to_string(),
            source_root: self.source.clone(),
            dest_root: self.dest.clone(),
            project_metadata: self.project_metadata.clone(),
            final_annotation_marker: "Final".to_string(),
            markers: ScanMarkers::default(),
            unmatched: UnmatchedPolicy::Skip,
        }
    }
}

/// Relative path and content of every file under `root`, sorted.
pub fn snapshot(root: &Utf8Path) -> Vec<(String, Vec<u8>)> {
    let mut files = walkdir::WalkDir::new(root.as_std_path())
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root.as_std_path())
                .unwrap()
                .to_string_lossy()
                .into_owned();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect::<Vec<_>>();
    files.sort();
    files
}
