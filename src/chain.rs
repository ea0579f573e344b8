use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::Value;

use crate::domain::ChainTarget;
use crate::error::KiraError;
use crate::merge::ProjectMetadata;
use crate::store::Store;

pub const CHAIN_SUFFIXES: [&str; 3] = ["_IGH", "_IGK", "_IGL"];

#[derive(Debug, Clone, Serialize)]
pub struct StripReport {
    pub metadata_path: Utf8PathBuf,
    pub repo_root: Utf8PathBuf,
    pub chain: String,
    pub repertoires: usize,
    pub rewritten: usize,
}

pub fn strip_chain_tokens(id: &str) -> String {
    CHAIN_SUFFIXES
        .iter()
        .fold(id.to_string(), |acc, suffix| acc.replace(suffix, ""))
}

/// Removes the chain tokens from every `repertoire_id`. Returns how many ids changed.
pub fn strip_chain_suffixes(metadata: &mut ProjectMetadata) -> Result<usize, KiraError> {
    let mut rewritten = 0;
    for repertoire in metadata.repertoires_mut()? {
        let id = repertoire
            .get("repertoire_id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                KiraError::MetadataShape("repertoire without a string repertoire_id".to_string())
            })?;
        let stripped = strip_chain_tokens(id);
        if stripped != id {
            rewritten += 1;
            repertoire["repertoire_id"] = Value::String(stripped);
        }
    }
    Ok(rewritten)
}

/// Rewrites `metadata_path` in place. The chain is the last segment of
/// `target_repo_path`; it is reported but not checked against the suffix list.
pub fn strip_chain_file(
    metadata_path: &Utf8Path,
    target_repo_path: &Utf8Path,
) -> Result<StripReport, KiraError> {
    let target = ChainTarget::from_path(target_repo_path);
    tracing::info!(chain = %target.chain, repo = %target.repo_root, "stripping chain tokens");

    let mut metadata = ProjectMetadata::load(metadata_path.as_std_path())?;
    let rewritten = strip_chain_suffixes(&mut metadata)?;
    let repertoires = metadata.repertoires_mut()?.len();
    Store::write_json_atomic(metadata_path, metadata.as_value())?;

    Ok(StripReport {
        metadata_path: metadata_path.to_path_buf(),
        repo_root: target.repo_root,
        chain: target.chain,
        repertoires,
        rewritten,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_occurrence() {
        assert_eq!(strip_chain_tokens("ABC123_IGH"), "ABC123");
        assert_eq!(strip_chain_tokens("S1_IGK_run_IGL"), "S1_run");
        assert_eq!(strip_chain_tokens("PLAIN"), "PLAIN");
    }
}
