use assert_matches::assert_matches;
use serde_json::json;

use kira_vdjbase_ingest::error::KiraError;
use kira_vdjbase_ingest::merge::{ProjectMetadata, data_processing_fragment, merge_recursive};

#[test]
fn maps_merge_lists_concatenate_scalars_overwrite() {
    let mut original = json!({"a": 1, "b": {"x": 1}, "c": [0]});
    let incoming = json!({"b": {"y": 2}, "c": [1]});
    merge_recursive(
        original.as_object_mut().unwrap(),
        incoming.as_object().unwrap(),
    );
    assert_eq!(original, json!({"a": 1, "b": {"x": 1, "y": 2}, "c": [0, 1]}));
}

#[test]
fn lists_keep_duplicates() {
    let mut original = json!({"tools": ["igblast"]});
    let incoming = json!({"tools": ["igblast"]});
    merge_recursive(
        original.as_object_mut().unwrap(),
        incoming.as_object().unwrap(),
    );
    assert_eq!(original, json!({"tools": ["igblast", "igblast"]}));
}

#[test]
fn mismatched_types_are_overwritten() {
    let mut original = json!({"a": {"x": 1}, "b": [1]});
    let incoming = json!({"a": [2], "b": "text"});
    merge_recursive(
        original.as_object_mut().unwrap(),
        incoming.as_object().unwrap(),
    );
    assert_eq!(original, json!({"a": [2], "b": "text"}));
}

#[test]
fn unmatched_repertoire_leaves_document_unchanged() {
    let document = json!({
        "Repertoire": [{"repertoire_id": "R1", "data_processing": [{"step": 1}]}]
    });
    let mut metadata = ProjectMetadata::from_value(document.clone());

    let updated = metadata.apply_fragment("R2", &json!({"step": 2})).unwrap();
    assert_eq!(updated, 0);
    assert_eq!(metadata.as_value(), &document);

    let updated = metadata.apply_fragment("R2", &json!({"step": 2})).unwrap();
    assert_eq!(updated, 0);
    assert_eq!(metadata.into_value(), document);
}

#[test]
fn every_matching_repertoire_is_updated() {
    let mut metadata = ProjectMetadata::from_value(json!({
        "Repertoire": [
            {"repertoire_id": "R1", "data_processing": [{"n": 1}, {"untouched": true}]},
            {"repertoire_id": "R1", "data_processing": [{"n": 2}]}
        ]
    }));

    let updated = metadata.apply_fragment("R1", &json!({"n": 9})).unwrap();
    assert_eq!(updated, 2);
    let value = metadata.as_value();
    assert_eq!(value["Repertoire"][0]["data_processing"][0], json!({"n": 9}));
    assert_eq!(
        value["Repertoire"][0]["data_processing"][1],
        json!({"untouched": true})
    );
    assert_eq!(value["Repertoire"][1]["data_processing"][0], json!({"n": 9}));
}

#[test]
fn missing_repertoire_array_is_a_shape_error() {
    let mut metadata = ProjectMetadata::from_value(json!({"Study": {}}));
    let err = metadata.apply_fragment("R1", &json!({})).unwrap_err();
    assert_matches!(err, KiraError::MetadataShape(_));
}

#[test]
fn scalar_fragment_is_rejected() {
    let mut metadata = ProjectMetadata::from_value(json!({"Repertoire": []}));
    let err = metadata.apply_fragment("R1", &json!("oops")).unwrap_err();
    assert_matches!(err, KiraError::MetadataShape(_));
}

#[test]
fn fragment_is_read_from_sample_data_processing() {
    let metadata = json!({"sample": {"data_processing": {"tool": "igblast"}}});
    assert_eq!(
        data_processing_fragment(&metadata).unwrap(),
        &json!({"tool": "igblast"})
    );

    let err = data_processing_fragment(&json!({"sample": {}})).unwrap_err();
    assert_matches!(err, KiraError::MetadataShape(_));
}
