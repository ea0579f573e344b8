use std::fs::File;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::VdjbaseName;
use crate::error::KiraError;

pub const CORRESPONDENCE_FILE: &str = "airr_correspondence.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondenceRow {
    pub airr_file: String,
    pub vdjbase_name: String,
    pub airr_repertoire_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepertoireEntry {
    pub project_name: String,
    pub vdjbase_name: String,
    pub project_number: String,
    pub individual: String,
    pub sample: String,
    pub airr_repertoire_id: String,
}

/// Entries keyed by `vdjbase_name`, kept in the order they appear in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepertoireMapping {
    entries: Vec<RepertoireEntry>,
}

impl RepertoireMapping {
    pub fn insert(&mut self, entry: RepertoireEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.vdjbase_name == entry.vdjbase_name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, vdjbase_name: &str) -> Option<&RepertoireEntry> {
        self.entries
            .iter()
            .find(|entry| entry.vdjbase_name == vdjbase_name)
    }

    pub fn first(&self) -> Option<&RepertoireEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepertoireEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CorrespondenceTable {
    rows: Vec<CorrespondenceRow>,
}

impl CorrespondenceTable {
    pub fn load(path: &Path) -> Result<Self, KiraError> {
        if !path.is_file() {
            return Err(KiraError::MissingCorrespondence(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|err| {
            KiraError::CorrespondenceParse(format!("open {}: {err}", path.display()))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, KiraError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b',')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in rdr.deserialize() {
            let row: CorrespondenceRow =
                result.map_err(|err| KiraError::CorrespondenceParse(err.to_string()))?;
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<CorrespondenceRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CorrespondenceRow] {
        &self.rows
    }

    /// Rows whose `airr_file` matches `project_name` as a regular expression.
    pub fn rows_for_project(
        &self,
        project_name: &str,
    ) -> Result<Vec<&CorrespondenceRow>, KiraError> {
        let pattern = Regex::new(project_name).map_err(|err| KiraError::InvalidProjectPattern {
            pattern: project_name.to_string(),
            message: err.to_string(),
        })?;
        Ok(self
            .rows
            .iter()
            .filter(|row| pattern.is_match(&row.airr_file))
            .collect())
    }

    pub fn derive_mapping(&self, project_name: &str) -> Result<RepertoireMapping, KiraError> {
        let rows = self.rows_for_project(project_name)?;
        if rows.is_empty() {
            return Err(KiraError::NoMatchingProject(project_name.to_string()));
        }

        let mut mapping = RepertoireMapping::default();
        for row in rows {
            let name: VdjbaseName = row.vdjbase_name.parse()?;
            mapping.insert(RepertoireEntry {
                project_name: project_name.to_string(),
                vdjbase_name: name.as_str().to_string(),
                project_number: name.project_number().to_string(),
                individual: name.individual().to_string(),
                sample: name.sample().to_string(),
                airr_repertoire_id: row.airr_repertoire_id.clone(),
            });
        }
        Ok(mapping)
    }

    pub fn expected_repertoire_ids(&self, project_name: &str) -> Result<Vec<String>, KiraError> {
        Ok(self
            .rows_for_project(project_name)?
            .into_iter()
            .map(|row| row.airr_repertoire_id.clone())
            .collect())
    }
}
