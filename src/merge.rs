use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::classifier::{AnnotatedResult, PreProcessedResult};
use crate::domain::{RepertoireDetails, UnmatchedPolicy};
use crate::error::KiraError;
use crate::store::Store;

/// Merges `incoming` into `original`: nested objects merge key-wise, arrays are
/// concatenated (incoming after original), anything else is overwritten.
pub fn merge_recursive(original: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        if let Some(existing) = original.get_mut(key) {
            match (existing, value) {
                (Value::Object(existing), Value::Object(value)) => {
                    merge_recursive(existing, value);
                    continue;
                }
                (Value::Array(existing), Value::Array(value)) => {
                    existing.extend(value.iter().cloned());
                    continue;
                }
                _ => {}
            }
        }
        original.insert(key.clone(), value.clone());
    }
}

/// `sample.data_processing` of an annotation or pre-processed metadata file.
pub fn data_processing_fragment(metadata: &Value) -> Result<&Value, KiraError> {
    metadata
        .get("sample")
        .and_then(|sample| sample.get("data_processing"))
        .ok_or_else(|| KiraError::MetadataShape("missing sample.data_processing".to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub applied: usize,
    pub unmatched: Vec<String>,
}

/// The master per-project document, `{"Repertoire": [...]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMetadata {
    document: Value,
}

impl ProjectMetadata {
    pub fn load(path: &Path) -> Result<Self, KiraError> {
        Ok(Self::from_value(Store::read_json(path)?))
    }

    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    pub fn repertoires_mut(&mut self) -> Result<&mut Vec<Value>, KiraError> {
        self.document
            .get_mut("Repertoire")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| KiraError::MetadataShape("missing Repertoire array".to_string()))
    }

    /// Merges `fragment` into `data_processing[0]` of every repertoire whose id is
    /// `repertoire_id`. Returns how many repertoires were updated.
    pub fn apply_fragment(
        &mut self,
        repertoire_id: &str,
        fragment: &Value,
    ) -> Result<usize, KiraError> {
        let pieces = match fragment {
            Value::Object(map) => vec![map],
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_object().ok_or_else(|| {
                        KiraError::MetadataShape(
                            "data_processing array must contain objects".to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(KiraError::MetadataShape(
                    "data_processing must be an object or an array".to_string(),
                ));
            }
        };

        let mut updated = 0;
        for repertoire in self.repertoires_mut()? {
            if repertoire.get("repertoire_id").and_then(Value::as_str) != Some(repertoire_id) {
                continue;
            }
            let target = repertoire
                .get_mut("data_processing")
                .and_then(Value::as_array_mut)
                .and_then(|steps| steps.first_mut())
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    KiraError::MetadataShape(format!(
                        "repertoire {repertoire_id} has no data_processing[0] object"
                    ))
                })?;
            for piece in &pieces {
                merge_recursive(target, piece);
            }
            updated += 1;
        }
        Ok(updated)
    }

    /// Applies annotated fragments first, then pre-processed ones.
    pub fn merge_results(
        &mut self,
        annotated: &[AnnotatedResult],
        pre_processed: &[PreProcessedResult],
        policy: UnmatchedPolicy,
    ) -> Result<MergeReport, KiraError> {
        let mut report = MergeReport::default();
        let sources = annotated
            .iter()
            .map(|result| (&result.repertoire_ids, &result.annotation_metadata))
            .chain(
                pre_processed
                    .iter()
                    .map(|result| (&result.repertoire_ids, &result.pre_processed_metadata)),
            );

        for (ids_path, metadata_path) in sources {
            let details = RepertoireDetails::load(ids_path.as_std_path())?;
            let metadata = Store::read_json(metadata_path.as_std_path())?;
            let fragment = data_processing_fragment(&metadata)?;
            let updated = self.apply_fragment(&details.repertoire_id, fragment)?;
            if updated > 0 {
                report.applied += 1;
                continue;
            }
            match policy {
                UnmatchedPolicy::Skip => {
                    tracing::warn!(
                        repertoire_id = %details.repertoire_id,
                        metadata = %metadata_path,
                        "no matching repertoire in project metadata, skipping"
                    );
                    report.unmatched.push(details.repertoire_id);
                }
                UnmatchedPolicy::Fail => {
                    return Err(KiraError::UnmatchedRepertoire(details.repertoire_id));
                }
            }
        }
        Ok(report)
    }
}
