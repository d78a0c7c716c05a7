use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::package::PackageRecord;

use super::decisions::Decisions;
use super::pool::{PackageId, Pool};

/// A single operation in a transaction
#[derive(Debug, Clone)]
pub enum Operation {
    /// Install a package
    Install(PackageId, Arc<PackageRecord>),
    /// Remove a package
    Remove(PackageId, Arc<PackageRecord>),
}

impl Operation {
    pub fn package_id(&self) -> PackageId {
        match self {
            Operation::Install(id, _) | Operation::Remove(id, _) => *id,
        }
    }

    pub fn record(&self) -> &Arc<PackageRecord> {
        match self {
            Operation::Install(_, record) | Operation::Remove(_, record) => record,
        }
    }

    pub fn name(&self) -> &str {
        &self.record().name
    }

    pub fn is_install(&self) -> bool {
        matches!(self, Operation::Install(..))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Install(_, record) => write!(f, "install {}", record.pretty_string()),
            Operation::Remove(_, record) => write!(f, "remove {}", record.pretty_string()),
        }
    }
}

/// Ordered install/remove operations derived from a solved assignment.
///
/// A version change of one name is expressed as Remove(old) before
/// Install(new). All removals precede all installs; installs follow
/// the requires graph (dependencies first), removals the reverse
/// (dependents first).
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub operations: Vec<Operation>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the solved assignment against the installed set.
    ///
    /// Installed ids decided to be absent become removals; newly
    /// decided ids not previously installed become installs; undecided
    /// installed ids stay untouched.
    pub fn from_decisions(pool: &Pool, decisions: &Decisions, installed: &[PackageId]) -> Self {
        let installed_set: HashSet<PackageId> = installed.iter().copied().collect();

        let mut removals = Vec::new();
        for &id in installed {
            if decisions.decided(id) && !decisions.decided_install(id) {
                if let Some(record) = pool.package(id) {
                    removals.push(Operation::Remove(id, record.clone()));
                }
            }
        }

        let mut installs = Vec::new();
        for id in decisions.installed_packages() {
            if !installed_set.contains(&id) {
                if let Some(record) = pool.package(id) {
                    installs.push(Operation::Install(id, record.clone()));
                }
            }
        }

        // Dependents are removed before their now-orphaned dependencies,
        // dependencies are installed before their dependents.
        let mut removals = topological_sort_operations(removals);
        removals.reverse();
        let installs = topological_sort_operations(installs);

        let mut operations = removals;
        operations.extend(installs);
        Self { operations }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// All packages being installed
    pub fn installs(&self) -> impl Iterator<Item = &Arc<PackageRecord>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Install(_, record) => Some(record),
            _ => None,
        })
    }

    /// All packages being removed
    pub fn removals(&self) -> impl Iterator<Item = &Arc<PackageRecord>> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Remove(_, record) => Some(record),
            _ => None,
        })
    }

    /// Remove/install pairs of one name, read as logical updates.
    pub fn updates(&self) -> impl Iterator<Item = (&Arc<PackageRecord>, &Arc<PackageRecord>)> {
        self.removals().filter_map(move |from| {
            self.installs()
                .find(|to| to.name == from.name)
                .map(|to| (from, to))
        })
    }

    pub fn summary(&self) -> TransactionSummary {
        let mut summary = TransactionSummary::default();
        for op in &self.operations {
            match op {
                Operation::Install(..) => summary.installs += 1,
                Operation::Remove(..) => summary.removals += 1,
            }
        }
        summary
    }
}

/// Summary of a transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionSummary {
    pub installs: usize,
    pub removals: usize,
}

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        if self.installs > 0 {
            parts.push(format!("{} install(s)", self.installs));
        }
        if self.removals > 0 {
            parts.push(format!("{} removal(s)", self.removals));
        }

        if parts.is_empty() {
            write!(f, "Nothing to do")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Order operations so dependencies come before the packages that
/// require them. Ties keep first-seen order.
fn topological_sort_operations(operations: Vec<Operation>) -> Vec<Operation> {
    if operations.len() < 2 {
        return operations;
    }

    // Provided and replaced names count: whoever fills a requirement
    // must be placed before its dependents
    let mut name_to_index: HashMap<&str, usize> = HashMap::new();
    for (idx, op) in operations.iter().enumerate() {
        for name in op.record().all_names() {
            name_to_index.insert(name, idx);
        }
    }

    // If A requires B, B must come before A.
    let mut in_degree: Vec<usize> = vec![0; operations.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); operations.len()];

    for (idx, op) in operations.iter().enumerate() {
        for dep in &op.record().requires {
            if let Some(&dep_idx) = name_to_index.get(dep.name.as_str()) {
                if dep_idx != idx {
                    dependents[dep_idx].push(idx);
                    in_degree[idx] += 1;
                }
            }
        }
    }

    // Kahn's algorithm
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut order: Vec<usize> = Vec::new();

    for (idx, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        order.push(idx);

        for &dependent_idx in &dependents[idx] {
            in_degree[dependent_idx] -= 1;
            if in_degree[dependent_idx] == 0 {
                queue.push_back(dependent_idx);
            }
        }
    }

    // Requires cycles leave remnants; append them in stable order.
    if order.len() != operations.len() {
        let in_order: HashSet<usize> = order.iter().copied().collect();
        for idx in 0..operations.len() {
            if !in_order.contains(&idx) {
                order.push(idx);
            }
        }
    }

    let mut slots: Vec<Option<Operation>> = operations.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Dependency;
    use crate::repository::Repository;
    use solv_version::{Constraint, Version};

    fn record(name: &str, version: &str) -> PackageRecord {
        PackageRecord::new(name, Version::parse(version).unwrap())
    }

    fn dep(name: &str) -> Dependency {
        Dependency::new(name, Constraint::Any)
    }

    fn pool_with(records: Vec<PackageRecord>) -> Pool {
        let mut pool = Pool::new();
        pool.add_repository(&Repository::from_records(records));
        pool
    }

    #[test]
    fn test_transaction_installs_in_dependency_order() {
        // c requires b, b requires a; ids 1=c, 2=b, 3=a
        let pool = pool_with(vec![
            record("c", "1.0").with_require(dep("b")),
            record("b", "1.0").with_require(dep("a")),
            record("a", "1.0"),
        ]);

        let mut decisions = Decisions::new();
        decisions.decide(1, None);
        decisions.decide(2, None);
        decisions.decide(3, None);

        let tx = Transaction::from_decisions(&pool, &decisions, &[]);
        let names: Vec<&str> = tx.installs().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_transaction_removals_before_installs() {
        let pool = pool_with(vec![record("a", "1.0"), record("a", "2.0")]);

        let mut decisions = Decisions::new();
        decisions.decide(-1, None);
        decisions.decide(2, None);

        // a-1.0 installed, a-2.0 decided in
        let tx = Transaction::from_decisions(&pool, &decisions, &[1]);

        assert_eq!(tx.len(), 2);
        assert!(matches!(tx.operations[0], Operation::Remove(1, _)));
        assert!(matches!(tx.operations[1], Operation::Install(2, _)));

        let updates: Vec<_> = tx.updates().collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0.version.to_string(), "1.0");
        assert_eq!(updates[0].1.version.to_string(), "2.0");
    }

    #[test]
    fn test_transaction_removes_dependents_first() {
        // b requires a; removing both must drop b before a
        let pool = pool_with(vec![
            record("a", "1.0"),
            record("b", "1.0").with_require(dep("a")),
        ]);

        let mut decisions = Decisions::new();
        decisions.decide(-1, None);
        decisions.decide(-2, None);

        let tx = Transaction::from_decisions(&pool, &decisions, &[1, 2]);
        let names: Vec<&str> = tx.removals().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_transaction_undecided_installed_stays() {
        let pool = pool_with(vec![record("a", "1.0"), record("b", "1.0")]);

        let mut decisions = Decisions::new();
        decisions.decide(2, None);

        // a (installed) is untouched by the decisions
        let tx = Transaction::from_decisions(&pool, &decisions, &[1]);
        assert_eq!(tx.len(), 1);
        assert!(matches!(tx.operations[0], Operation::Install(2, _)));
    }

    #[test]
    fn test_transaction_cycle_does_not_hang() {
        let pool = pool_with(vec![
            record("x", "1.0").with_require(dep("y")),
            record("y", "1.0").with_require(dep("x")),
        ]);

        let mut decisions = Decisions::new();
        decisions.decide(1, None);
        decisions.decide(2, None);

        let tx = Transaction::from_decisions(&pool, &decisions, &[]);
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn test_transaction_summary() {
        let pool = pool_with(vec![record("a", "1.0"), record("b", "1.0")]);

        let mut decisions = Decisions::new();
        decisions.decide(1, None);
        decisions.decide(-2, None);

        let tx = Transaction::from_decisions(&pool, &decisions, &[2]);
        let summary = tx.summary();
        assert_eq!(summary.installs, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.to_string(), "1 install(s), 1 removal(s)");
    }
}
