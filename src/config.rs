use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::UnmatchedPolicy;
use crate::error::KiraError;

pub const DEFAULT_CONFIG_FILE: &str = "kira-vdjbase.json";
pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_PRIMARY_FILE_MARKER: &str = "Finale";
pub const DEFAULT_FINAL_ANNOTATION_MARKER: &str = "Final";
pub const DEFAULT_METADATA_FOLDER_MARKER: &str = "meta_data";

/// On-disk configuration. Every field is optional; command-line overrides win.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub source_root: Option<Utf8PathBuf>,
    #[serde(default)]
    pub dest_root: Option<Utf8PathBuf>,
    #[serde(default)]
    pub project_metadata: Option<Utf8PathBuf>,
    #[serde(default)]
    pub primary_file_marker: Option<String>,
    #[serde(default)]
    pub final_annotation_marker: Option<String>,
    #[serde(default)]
    pub metadata_folder_marker: Option<String>,
    #[serde(default)]
    pub required_file_markers: Option<Vec<String>>,
    #[serde(default)]
    pub unmatched_repertoires: Option<UnmatchedPolicy>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_name: Option<String>,
    pub source_root: Option<Utf8PathBuf>,
    pub dest_root: Option<Utf8PathBuf>,
    pub project_metadata: Option<Utf8PathBuf>,
    pub primary_file_marker: Option<String>,
    pub required_file_markers: Vec<String>,
    pub strict: bool,
}

/// Naming conventions used while scanning the sequence data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMarkers {
    pub primary_file: String,
    pub metadata_folder: String,
    pub required_files: Vec<String>,
}

impl Default for ScanMarkers {
    fn default() -> Self {
        Self {
            primary_file: DEFAULT_PRIMARY_FILE_MARKER.to_string(),
            metadata_folder: DEFAULT_METADATA_FOLDER_MARKER.to_string(),
            required_files: default_required_file_markers(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project_name: String,
    pub source_root: Utf8PathBuf,
    pub dest_root: Utf8PathBuf,
    pub project_metadata: Utf8PathBuf,
    pub final_annotation_marker: String,
    pub markers: ScanMarkers,
    pub unmatched: UnmatchedPolicy,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `kira-vdjbase.json` from the current directory when it
    /// exists, and layers `overrides` on top.
    pub fn resolve(
        path: Option<&Utf8Path>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, KiraError> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Utf8Path::new(DEFAULT_CONFIG_FILE);
                if default_path.as_std_path().exists() {
                    Self::read(default_path)?
                } else {
                    Config::default()
                }
            }
        };
        Self::resolve_config(config, overrides)
    }

    pub fn read(path: &Utf8Path) -> Result<Config, KiraError> {
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|_| KiraError::ConfigRead(path.as_std_path().to_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| KiraError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, KiraError> {
        match config.schema_version {
            Some(version) if version != CONFIG_SCHEMA_VERSION => {
                return Err(KiraError::UnsupportedConfigVersion(version));
            }
            _ => {}
        }

        let project_name = overrides
            .project_name
            .or(config.project_name)
            .ok_or(KiraError::MissingSetting("project_name"))?;
        let source_root = overrides
            .source_root
            .or(config.source_root)
            .ok_or(KiraError::MissingSetting("source_root"))?;
        let dest_root = overrides
            .dest_root
            .or(config.dest_root)
            .ok_or(KiraError::MissingSetting("dest_root"))?;
        let project_metadata = match overrides.project_metadata.or(config.project_metadata) {
            Some(path) => path,
            None => default_project_metadata(&source_root)
                .ok_or(KiraError::MissingSetting("project_metadata"))?,
        };

        let required_files = if overrides.required_file_markers.is_empty() {
            config
                .required_file_markers
                .unwrap_or_else(default_required_file_markers)
        } else {
            overrides.required_file_markers
        };
        let markers = ScanMarkers {
            primary_file: overrides
                .primary_file_marker
                .or(config.primary_file_marker)
                .unwrap_or_else(|| DEFAULT_PRIMARY_FILE_MARKER.to_string()),
            metadata_folder: config
                .metadata_folder_marker
                .unwrap_or_else(|| DEFAULT_METADATA_FOLDER_MARKER.to_string()),
            required_files,
        };

        let unmatched = if overrides.strict {
            UnmatchedPolicy::Fail
        } else {
            config.unmatched_repertoires.unwrap_or_default()
        };

        Ok(ResolvedConfig {
            project_name,
            source_root,
            dest_root,
            project_metadata,
            final_annotation_marker: config
                .final_annotation_marker
                .unwrap_or_else(|| DEFAULT_FINAL_ANNOTATION_MARKER.to_string()),
            markers,
            unmatched,
        })
    }
}

pub fn default_required_file_markers() -> Vec<String> {
    vec![
        "haplotype".to_string(),
        "genotype".to_string(),
        "ogrdb_plots.pdf".to_string(),
        "ogrdb_report.csv".to_string(),
    ]
}

/// `<project>/runs/current` keeps its metadata at `<project>/project_metadata/metadata.json`.
pub fn default_project_metadata(source_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let project_dir = source_root.parent()?.parent()?;
    Some(project_dir.join("project_metadata").join("metadata.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_markers() {
        let overrides = ConfigOverrides {
            project_name: Some("PRJNA248411".to_string()),
            source_root: Some(Utf8PathBuf::from("/store/PRJNA248411/runs/current")),
            dest_root: Some(Utf8PathBuf::from("/repo/IGH")),
            ..ConfigOverrides::default()
        };

        let resolved = ConfigLoader::resolve_config(Config::default(), overrides).unwrap();
        assert_eq!(resolved.markers, ScanMarkers::default());
        assert_eq!(resolved.final_annotation_marker, "Final");
        assert_eq!(resolved.unmatched, UnmatchedPolicy::Skip);
        assert_eq!(
            resolved.project_metadata,
            Utf8PathBuf::from("/store/PRJNA248411/project_metadata/metadata.json")
        );
    }
}
