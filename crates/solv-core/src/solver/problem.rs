use std::fmt;

use super::pool::{PackageId, Pool};
use super::rule::{Literal, Rule, RuleType};

/// A problem encountered during dependency resolution.
///
/// Problems carry the rules that cannot be jointly satisfied and
/// explain why a solution cannot be found.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    /// Rules involved in this problem
    pub rules: Vec<ProblemRule>,
    /// Optional top-level explanation
    pub message: Option<String>,
}

/// A rule that contributes to a problem
#[derive(Debug, Clone)]
pub struct ProblemRule {
    pub rule_id: u32,
    pub rule_type: RuleType,
    /// The rule's clause; the reported rules form a standalone
    /// unsatisfiable formula
    pub literals: Vec<Literal>,
    /// Originating package id
    pub source: Option<PackageId>,
    /// Target package name
    pub target: Option<String>,
    /// Constraint text
    pub constraint: Option<String>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: &Rule) {
        // A rule may reach the problem twice via different trails
        if self.rules.iter().any(|r| r.rule_id == rule.id()) {
            return;
        }
        self.rules.push(ProblemRule {
            rule_id: rule.id(),
            rule_type: rule.rule_type(),
            literals: rule.literals().to_vec(),
            source: rule.source_package(),
            target: rule.target_name().map(String::from),
            constraint: rule.constraint().map(String::from),
        });
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Human-readable description of this problem
    pub fn describe(&self, pool: &Pool) -> String {
        let mut lines = Vec::new();

        for rule in &self.rules {
            let line = describe_rule(pool, rule);
            if !line.is_empty() {
                lines.push(format!("  - {}", line));
            }
        }

        if let Some(ref msg) = self.message {
            format!("{}\n{}", msg, lines.join("\n"))
        } else {
            lines.join("\n")
        }
    }
}

fn source_name(rule: &ProblemRule, pool: &Pool) -> String {
    rule.source
        .and_then(|id| pool.package(id))
        .map(|p| p.pretty_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn describe_rule(pool: &Pool, rule: &ProblemRule) -> String {
    let target = rule.target.as_deref().unwrap_or("unknown");
    let constraint = rule.constraint.as_deref().unwrap_or("*");

    match rule.rule_type {
        RuleType::JobInstall => {
            let has_packages = !pool.packages_by_name(target).is_empty();
            if has_packages {
                format!(
                    "request requires {} {}, but no version satisfying the constraint can be installed",
                    target, constraint
                )
            } else {
                format!(
                    "request requires {} {}, but no matching package was found",
                    target, constraint
                )
            }
        }
        RuleType::JobRemove => {
            format!("request removes {}", target)
        }
        RuleType::JobUpdate => {
            format!("request updates {} to {}", target, constraint)
        }
        RuleType::Requires => {
            format!("{} requires {} {}", source_name(rule, pool), target, constraint)
        }
        RuleType::Conflict => {
            format!("{} conflicts with {}", source_name(rule, pool), target)
        }
        RuleType::SameName => {
            format!("only one version of {} can be installed", target)
        }
        RuleType::Learned => "learned constraint from conflict analysis".to_string(),
    }
}

/// Collection of problems encountered during solving
#[derive(Debug, Default)]
pub struct ProblemSet {
    problems: Vec<Problem>,
}

impl ProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, problem: Problem) {
        self.problems.push(problem);
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Complete description of all problems
    pub fn describe(&self, pool: &Pool) -> String {
        let descriptions: Vec<_> = self
            .problems
            .iter()
            .enumerate()
            .map(|(i, p)| format!("Problem {}:\n{}", i + 1, p.describe(pool)))
            .collect();

        if descriptions.is_empty() {
            "No problems found".to_string()
        } else {
            descriptions.join("\n\n")
        }
    }
}

impl fmt::Display for ProblemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problem(s) found", self.problems.len())
    }
}
