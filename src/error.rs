use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum KiraError {
    #[error("directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("airr_correspondence.csv not found in the target repo at {0}")]
    #[diagnostic(help("the correspondence table must live directly inside the destination root"))]
    MissingCorrespondence(PathBuf),

    #[error("failed to parse correspondence table: {0}")]
    CorrespondenceParse(String),

    #[error("no matching project name {0} found in airr_correspondence.csv")]
    NoMatchingProject(String),

    #[error("invalid project name pattern {pattern}: {message}")]
    InvalidProjectPattern { pattern: String, message: String },

    #[error("invalid vdjbase_name (expected projectNumber_individual_sample): {0}")]
    InvalidVdjbaseName(String),

    #[error("annotated folder does not exist: {0}")]
    MissingAnnotatedTree(PathBuf),

    #[error("missing 'Final' annotation files for the following repertoires: {}", .0.join(", "))]
    MissingAnnotations(Vec<String>),

    #[error("repertoire {0} has no entry in the project metadata document")]
    UnmatchedRepertoire(String),

    #[error("the source file does not exist: {0}")]
    SourceNotFound(PathBuf),

    #[error("failed to read metadata at {path}: {message}")]
    MetadataRead { path: PathBuf, message: String },

    #[error("unexpected metadata layout: {0}")]
    MetadataShape(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("unsupported config schema_version {0}")]
    #[diagnostic(help("this build reads schema_version 1"))]
    UnsupportedConfigVersion(u32),

    #[error("missing required setting: {0}")]
    #[diagnostic(help("pass it on the command line or set it in kira-vdjbase.json"))]
    MissingSetting(&'static str),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

/// Coarse grouping used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Precondition,
    Completeness,
    Copy,
    Other,
}

impl KiraError {
    pub fn class(&self) -> ErrorClass {
        match self {
            KiraError::MissingDirectory(_)
            | KiraError::MissingCorrespondence(_)
            | KiraError::NoMatchingProject(_)
            | KiraError::InvalidProjectPattern { .. }
            | KiraError::InvalidVdjbaseName(_)
            | KiraError::MissingAnnotatedTree(_)
            | KiraError::ConfigRead(_)
            | KiraError::ConfigParse(_)
            | KiraError::UnsupportedConfigVersion(_)
            | KiraError::MissingSetting(_) => ErrorClass::Precondition,
            KiraError::MissingAnnotations(_) | KiraError::UnmatchedRepertoire(_) => {
                ErrorClass::Completeness
            }
            KiraError::SourceNotFound(_) => ErrorClass::Copy,
            KiraError::CorrespondenceParse(_)
            | KiraError::MetadataRead { .. }
            | KiraError::MetadataShape(_)
            | KiraError::Filesystem(_) => ErrorClass::Other,
        }
    }
}
