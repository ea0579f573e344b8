use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::KiraError;

/// What to do when a scanned repertoire has no entry in the project metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    #[default]
    Skip,
    Fail,
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedPolicy::Skip => write!(f, "skip"),
            UnmatchedPolicy::Fail => write!(f, "fail"),
        }
    }
}

/// `projectNumber_individual_sample`, e.g. `P1_I1_S1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VdjbaseName {
    raw: String,
    project_number: String,
    individual: String,
    sample: String,
}

impl VdjbaseName {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn project_number(&self) -> &str {
        &self.project_number
    }

    pub fn individual(&self) -> &str {
        &self.individual
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }
}

impl fmt::Display for VdjbaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for VdjbaseName {
    type Err = KiraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value.split('_').collect::<Vec<_>>();
        let [project_number, individual, sample] = parts.as_slice() else {
            return Err(KiraError::InvalidVdjbaseName(value.to_string()));
        };
        Ok(Self {
            raw: value.to_string(),
            project_number: project_number.to_string(),
            individual: individual.to_string(),
            sample: sample.to_string(),
        })
    }
}

/// Contents of a `repertoire_id.json` file. Only `repertoire_id` is matched on,
/// the other two keys must be present but may hold any JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepertoireDetails {
    pub repertoire_id: String,
    pub subject_id: Value,
    pub sample_id: Value,
}

impl RepertoireDetails {
    pub fn load(path: &Path) -> Result<Self, KiraError> {
        let content = fs::read_to_string(path).map_err(|err| KiraError::MetadataRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|err| KiraError::MetadataRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

/// Destination of a chain-specific repository, `.../<repo>/AIRR-seq/<species>/<chain>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainTarget {
    pub repo_root: Utf8PathBuf,
    pub chain: String,
}

impl ChainTarget {
    pub fn from_path(path: &Utf8Path) -> Self {
        let parts = path
            .as_str()
            .trim_end_matches('/')
            .split('/')
            .collect::<Vec<_>>();
        let chain = parts.last().copied().unwrap_or_default().to_string();
        let repo_root = parts[..parts.len().saturating_sub(3)].join("/");
        Self {
            repo_root: Utf8PathBuf::from(repo_root),
            chain,
        }
    }
}
