use std::sync::Arc;

use indexmap::IndexMap;
use solv_version::Constraint;

use crate::package::PackageRecord;
use crate::repository::Repository;

use super::rule::Literal;

/// A package decision variable in the SAT encoding.
/// Positive literals mean "install package", negative means "don't install".
pub type PackageId = i32;

/// Pool of all available packages for dependency resolution.
///
/// The pool indexes package records by ID (1-based) and by name. Each
/// record gets a unique id used as a literal in SAT clauses; ids are
/// stable for the lifetime of one resolution run. The pool is built
/// once and treated as read-only while solving.
#[derive(Debug, Default)]
pub struct Pool {
    /// All records; id N lives at index N-1
    records: Vec<Arc<PackageRecord>>,

    /// Package IDs indexed by name (lowercase), in first-seen order
    packages_by_name: IndexMap<String, Vec<PackageId>>,

    /// Package IDs indexed by provided/replaced name (lowercase)
    providers: IndexMap<String, Vec<PackageId>>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest every record of a repository, assigning fresh 1-based ids
    /// in submission order. Returns the assigned ids.
    pub fn add_repository(&mut self, repository: &Repository) -> Vec<PackageId> {
        let mut ids = Vec::with_capacity(repository.len());
        for record in repository.iter() {
            ids.push(self.add_record(record.clone()));
        }
        log::debug!(
            "pool: added {} records, {} total",
            ids.len(),
            self.records.len()
        );
        ids
    }

    /// Add a single record, returning its id.
    pub fn add_record(&mut self, record: Arc<PackageRecord>) -> PackageId {
        let id = (self.records.len() + 1) as PackageId;

        self.packages_by_name
            .entry(record.name.clone())
            .or_default()
            .push(id);

        for dep in record.provides.iter().chain(record.replaces.iter()) {
            self.providers.entry(dep.name.clone()).or_default().push(id);
        }

        self.records.push(record);
        id
    }

    pub fn package(&self, id: PackageId) -> Option<&Arc<PackageRecord>> {
        if id <= 0 {
            return None;
        }
        self.records.get(id as usize - 1)
    }

    /// Ids of every record carrying this exact name
    pub fn packages_by_name(&self, name: &str) -> &[PackageId] {
        self.packages_by_name
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All ids whose name, provides or replaces match `name` and whose
    /// version satisfies `constraint`.
    ///
    /// The result is ordered newest-version-first with ties broken by
    /// id, so candidate order is a deterministic total order. An
    /// unknown name yields an empty vector, never an error.
    pub fn what_provides(&self, name: &str, constraint: Option<&Constraint>) -> Vec<PackageId> {
        let name = name.to_lowercase();
        let mut ids: Vec<PackageId> = Vec::new();

        if let Some(direct) = self.packages_by_name.get(&name) {
            ids.extend_from_slice(direct);
        }
        if let Some(provided) = self.providers.get(&name) {
            for &id in provided {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        if let Some(constraint) = constraint {
            if !constraint.is_any() {
                ids.retain(|&id| {
                    self.package(id)
                        .map(|p| constraint.matches(&p.version))
                        .unwrap_or(false)
                });
            }
        }

        ids.sort_by(|&a, &b| {
            let va = &self.records[a as usize - 1].version;
            let vb = &self.records[b as usize - 1].version;
            vb.cmp(va).then_with(|| a.cmp(&b))
        });

        ids
    }

    /// Signed `+name-version` rendering of a literal for diagnostics.
    pub fn id_to_string(&self, literal: Literal) -> String {
        let sign = if literal > 0 { "+" } else { "-" };
        match self.package(literal.abs()) {
            Some(record) => format!("{}{}", sign, record.pretty_string()),
            None => format!("{}?{}", sign, literal.abs()),
        }
    }

    /// Number of records in the pool
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All valid package ids, 1..=len
    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> {
        1..=self.records.len() as PackageId
    }
}
