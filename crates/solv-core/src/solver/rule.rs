use std::fmt;
use std::hash::{Hash, Hasher};

use super::pool::PackageId;

/// A literal in SAT terms - positive means "install", negative means "don't install"
pub type Literal = i32;

/// Provenance of a rule generated during dependency resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// Install job: at least one candidate must be installed
    JobInstall,
    /// Remove job: this package must not be installed
    JobRemove,
    /// Update job: a superseded installed version must go
    JobUpdate,
    /// Package dependency: if A is installed, then B|C|D must be installed
    Requires,
    /// Package conflict: A and B cannot both be installed
    Conflict,
    /// Two versions of the same name cannot both be installed
    SameName,
    /// Learned clause from conflict analysis
    Learned,
}

impl RuleType {
    /// Whether this rule came from a request job rather than package metadata
    pub fn is_job(&self) -> bool {
        matches!(
            self,
            RuleType::JobInstall | RuleType::JobRemove | RuleType::JobUpdate
        )
    }
}

/// A SAT rule (clause) over package-id literals.
///
/// Rules are disjunctions: a rule is satisfied when at least one of its
/// literals is true. They are immutable once created; only learned rules
/// are appended during solving.
///
/// # Examples
///
/// - `[A]` - Package A must be installed (assertion)
/// - `[-A]` - Package A must not be installed
/// - `[-A, B, C]` - If A is installed, then B or C must be installed
/// - `[-A, -B]` - A and B cannot both be installed
#[derive(Clone)]
pub struct Rule {
    literals: Vec<Literal>,
    rule_type: RuleType,
    /// Assigned by RuleSet
    id: u32,
    /// Originating package, for diagnostics
    source_package: Option<PackageId>,
    /// Target name, for diagnostics
    target_name: Option<String>,
    /// Constraint text, for diagnostics
    constraint: Option<String>,
}

impl Rule {
    pub fn new(literals: Vec<Literal>, rule_type: RuleType) -> Self {
        Self {
            literals,
            rule_type,
            id: 0,
            source_package: None,
            target_name: None,
            constraint: None,
        }
    }

    /// Single literal that must be true
    pub fn assertion(literal: Literal, rule_type: RuleType) -> Self {
        Self::new(vec![literal], rule_type)
    }

    /// If source is installed, one of targets must be
    pub fn requires(source: PackageId, targets: Vec<PackageId>) -> Self {
        let mut literals = vec![-source];
        literals.extend(targets);
        Self::new(literals, RuleType::Requires)
    }

    /// The two packages cannot both be installed
    pub fn conflict(a: PackageId, b: PackageId) -> Self {
        Self::new(vec![-a, -b], RuleType::Conflict)
    }

    /// Two versions of one name cannot both be installed
    pub fn same_name(a: PackageId, b: PackageId) -> Self {
        Self::new(vec![-a, -b], RuleType::SameName)
    }

    /// At least one candidate of an install job must be installed.
    /// An empty candidate list yields the empty rule, the designed
    /// signal for "no package satisfies this job".
    pub fn job_install(candidates: Vec<PackageId>) -> Self {
        Self::new(candidates, RuleType::JobInstall)
    }

    /// The package must not be installed
    pub fn job_remove(package: PackageId) -> Self {
        Self::assertion(-package, RuleType::JobRemove)
    }

    /// A superseded installed version must not stay installed
    pub fn job_update_remove(package: PackageId) -> Self {
        Self::assertion(-package, RuleType::JobUpdate)
    }

    /// Learned rule from conflict analysis
    pub fn learned(literals: Vec<Literal>) -> Self {
        Self::new(literals, RuleType::Learned)
    }

    pub fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Set source package for diagnostics
    pub fn with_source(mut self, package: PackageId) -> Self {
        self.source_package = Some(package);
        self
    }

    /// Set target name for diagnostics
    pub fn with_target(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    /// Set constraint text for diagnostics
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn source_package(&self) -> Option<PackageId> {
        self.source_package
    }

    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// Single-literal rules force a decision before search starts
    pub fn is_assertion(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Hash of the sorted literal content, for deduplication
    pub fn literal_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();

        let mut sorted = self.literals.clone();
        sorted.sort_unstable();
        sorted.hash(&mut hasher);

        hasher.finish()
    }

    /// Whether two rules have the same literals, regardless of order
    pub fn equals_literals(&self, other: &Rule) -> bool {
        if self.literals.len() != other.literals.len() {
            return false;
        }

        let mut a = self.literals.clone();
        let mut b = other.literals.clone();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    fn rule_type_str(&self) -> &'static str {
        match self.rule_type {
            RuleType::JobInstall => "job-install",
            RuleType::JobRemove => "job-remove",
            RuleType::JobUpdate => "job-update",
            RuleType::Requires => "requires",
            RuleType::Conflict => "conflict",
            RuleType::SameName => "same-name",
            RuleType::Learned => "learned",
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:?}, {:?})", self.rule_type, self.literals)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals: Vec<String> = self
            .literals
            .iter()
            .map(|&l| {
                if l > 0 {
                    format!("+{}", l)
                } else {
                    format!("{}", l)
                }
            })
            .collect();

        write!(f, "({}) [{}]", self.rule_type_str(), literals.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_assertion() {
        let rule = Rule::assertion(5, RuleType::JobInstall);
        assert!(rule.is_assertion());
        assert_eq!(rule.literals(), &[5]);
    }

    #[test]
    fn test_rule_requires() {
        let rule = Rule::requires(1, vec![2, 3, 4]);
        assert_eq!(rule.literals(), &[-1, 2, 3, 4]);
        assert_eq!(rule.rule_type(), RuleType::Requires);
    }

    #[test]
    fn test_rule_conflict() {
        let rule = Rule::conflict(1, 2);
        assert_eq!(rule.literals(), &[-1, -2]);
        assert_eq!(rule.rule_type(), RuleType::Conflict);
    }

    #[test]
    fn test_rule_job_remove_is_negative_assertion() {
        let rule = Rule::job_remove(7);
        assert!(rule.is_assertion());
        assert_eq!(rule.literals(), &[-7]);
        assert!(rule.rule_type().is_job());
    }

    #[test]
    fn test_rule_empty_job_install() {
        let rule = Rule::job_install(vec![]);
        assert!(rule.is_empty());
        assert!(!rule.is_assertion());
    }

    #[test]
    fn test_rule_literal_hash() {
        let rule1 = Rule::new(vec![1, 2, 3], RuleType::Requires);
        let rule2 = Rule::new(vec![3, 1, 2], RuleType::Requires);
        let rule3 = Rule::new(vec![1, 2, 4], RuleType::Requires);

        assert_eq!(rule1.literal_hash(), rule2.literal_hash());
        assert_ne!(rule1.literal_hash(), rule3.literal_hash());
    }

    #[test]
    fn test_rule_equals_literals() {
        let rule1 = Rule::new(vec![1, 2, 3], RuleType::Requires);
        let rule2 = Rule::new(vec![3, 1, 2], RuleType::Conflict);
        let rule3 = Rule::new(vec![1, 2], RuleType::Requires);

        assert!(rule1.equals_literals(&rule2));
        assert!(!rule1.equals_literals(&rule3));
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::requires(1, vec![2, 3]);
        let display = format!("{}", rule);
        assert!(display.contains("requires"));
        assert!(display.contains("-1"));
    }
}
