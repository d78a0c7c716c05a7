use std::sync::Arc;

use serde::Deserialize;
use solv_version::{Constraint, Version};

use crate::error::SolverError;
use crate::package::{Dependency, PackageRecord};

/// An ordered collection of package records from one catalog.
///
/// Repositories are the loader-facing value: they validate record text
/// once, so malformed versions or constraints never reach the solver.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    records: Vec<Arc<PackageRecord>>,
}

/// Wire shape of one package record.
#[derive(Debug, Deserialize)]
struct RawRecord {
    name: String,
    version: String,
    #[serde(default, rename = "require")]
    requires: Vec<RawDependency>,
    #[serde(default, rename = "conflict")]
    conflicts: Vec<RawDependency>,
    #[serde(default, rename = "provide")]
    provides: Vec<RawDependency>,
    #[serde(default, rename = "replace")]
    replaces: Vec<RawDependency>,
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    name: String,
    #[serde(default)]
    constraint: Option<String>,
}

impl RawDependency {
    fn parse(self) -> Result<Dependency, SolverError> {
        let constraint = match self.constraint {
            Some(text) => Constraint::parse(&text).map_err(|e| {
                SolverError::InvalidRecord(format!(
                    "bad constraint for {}: {}",
                    self.name, e
                ))
            })?,
            None => Constraint::Any,
        };
        Ok(Dependency::new(self.name, constraint))
    }
}

impl RawRecord {
    fn parse(self) -> Result<PackageRecord, SolverError> {
        let version = Version::parse(&self.version).map_err(|e| {
            SolverError::InvalidRecord(format!("bad version for {}: {}", self.name, e))
        })?;

        let mut record = PackageRecord::new(self.name, version);
        for dep in self.requires {
            record.requires.push(dep.parse()?);
        }
        for dep in self.conflicts {
            record.conflicts.push(dep.parse()?);
        }
        for dep in self.provides {
            record.provides.push(dep.parse()?);
        }
        for dep in self.replaces {
            record.replaces.push(dep.parse()?);
        }
        Ok(record)
    }
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from already-validated records.
    pub fn from_records(records: impl IntoIterator<Item = PackageRecord>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a JSON array of package records.
    pub fn from_json_str(json: &str) -> Result<Self, SolverError> {
        let raw: Vec<RawRecord> = serde_json::from_str(json)?;
        let mut repository = Self::new();
        for record in raw {
            repository.records.push(Arc::new(record.parse()?));
        }
        log::debug!("loaded {} package records", repository.len());
        Ok(repository)
    }

    pub fn add(&mut self, record: PackageRecord) {
        self.records.push(Arc::new(record));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PackageRecord>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
