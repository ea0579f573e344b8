mod common;

use std::fs::{self, File, FileTimes};
use std::time::{Duration, SystemTime};

use assert_matches::assert_matches;

use kira_vdjbase_ingest::config::ScanMarkers;
use kira_vdjbase_ingest::copier::{copy_file, copy_required_files};
use kira_vdjbase_ingest::correspondence::CorrespondenceTable;
use kira_vdjbase_ingest::error::{ErrorClass, KiraError};
use kira_vdjbase_ingest::scanner;
use kira_vdjbase_ingest::store::Store;

use common::{CORRESPONDENCE, PROJECT, fixture, utf8, write};

#[test]
fn missing_source_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8(temp.path());
    let destination = root.join("out/nested/file.tsv");

    let err = copy_file(
        root.join("absent.tsv").as_std_path(),
        destination.as_std_path(),
    )
    .unwrap_err();
    assert_eq!(err.class(), ErrorClass::Copy);
    assert_matches!(err, KiraError::SourceNotFound(_));
    assert!(!root.join("out").as_std_path().exists());
}

#[test]
fn copy_keeps_content_and_modification_time() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8(temp.path());
    let source = root.join("src/genotype.tsv");
    write(&source, "allele\tcount\n");

    let stamp = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    File::options()
        .write(true)
        .open(source.as_std_path())
        .unwrap()
        .set_times(FileTimes::new().set_modified(stamp))
        .unwrap();

    let destination = root.join("dst/a/b/genotype.tsv");
    copy_file(source.as_std_path(), destination.as_std_path()).unwrap();

    assert_eq!(
        fs::read_to_string(destination.as_std_path()).unwrap(),
        "allele\tcount\n"
    );
    let modified = fs::metadata(destination.as_std_path())
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(modified, stamp);
}

#[test]
fn required_files_land_in_sample_folders() {
    let fx = fixture();
    let table = CorrespondenceTable::from_reader(CORRESPONDENCE.as_bytes()).unwrap();
    let mapping = table.derive_mapping(PROJECT).unwrap();
    let scan = scanner::scan_project(&fx.source, &ScanMarkers::default()).unwrap();
    let store = Store::new(fx.dest.clone());

    let copied = copy_required_files(&mapping, &scan.annotated, &store).unwrap();
    assert_eq!(copied.len(), 6);
    assert!(copied.iter().all(|file| file.destination.starts_with(fx.dest.join("samples/P1"))));
    assert!(
        copied
            .iter()
            .filter(|file| file.vdjbase_name == "P1_I2_S1")
            .all(|file| file.source.as_str().contains("SUBJ_REP2"))
    );
}

#[test]
fn sample_folders_exist_even_without_results() {
    let fx = fixture();
    let table = CorrespondenceTable::from_reader(CORRESPONDENCE.as_bytes()).unwrap();
    let mapping = table.derive_mapping(PROJECT).unwrap();
    let store = Store::new(fx.dest.clone());

    let copied = copy_required_files(&mapping, &[], &store).unwrap();
    assert!(copied.is_empty());
    assert!(fx.dest.join("samples/P1/P1_I1_S1").as_std_path().is_dir());
    assert!(fx.dest.join("samples/P1/P1_I2_S1").as_std_path().is_dir());
}
