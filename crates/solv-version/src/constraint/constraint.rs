use std::fmt;

use super::Operator;
use crate::parser::{parse_constraints, ParseError};
use crate::version::Version;

/// A version constraint expression.
///
/// Constraints are closed variants rather than a trait hierarchy: the
/// resolver only ever needs to evaluate them against candidate versions
/// and render them for diagnostics.
///
/// # Examples
///
/// - `Any` matches every version (`*`)
/// - `Comparison(>=, 1.8.1-2)` matches versions at least `1.8.1-2`
/// - `Caret(1.2)` matches `>= 1.2, < 2`
/// - `And`/`Or` combine sub-constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Matches any version (`*`).
    Any,
    /// A single comparison, e.g. `>= 1.8.1`.
    Comparison(Operator, Version),
    /// Compatible-release range: `^1.2` is `>= 1.2, < 2`; `^0.2.1` is
    /// `>= 0.2.1, < 0.3`.
    Caret(Version),
    /// Conjunction: every part must match.
    And(Vec<Constraint>),
    /// Disjunction: at least one part must match.
    Or(Vec<Constraint>),
}

impl Constraint {
    /// Parse a constraint expression, e.g. `>= 1.8.1-2, < 2` or
    /// `^1.2 || > 3`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        parse_constraints(input)
    }

    /// Check whether `version` satisfies this constraint.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Comparison(op, bound) => op.evaluates(version.cmp(bound)),
            Constraint::Caret(lower) => {
                if version < lower {
                    return false;
                }
                // Bump the first non-zero segment; ^0.2.1 caps at 0.3.
                let bump_index = lower
                    .release
                    .iter()
                    .position(|&s| s != 0)
                    .unwrap_or(lower.release.len().saturating_sub(1));
                *version < lower.bumped(bump_index)
            }
            Constraint::And(parts) => parts.iter().all(|c| c.matches(version)),
            Constraint::Or(parts) => parts.iter().any(|c| c.matches(version)),
        }
    }

    /// True for the `*` constraint.
    pub fn is_any(&self) -> bool {
        matches!(self, Constraint::Any)
    }

    /// Combine parsed parts into a conjunction, flattening trivial cases.
    pub(crate) fn conjunction(mut parts: Vec<Constraint>) -> Constraint {
        match parts.len() {
            0 => Constraint::Any,
            1 => parts.remove(0),
            _ => Constraint::And(parts),
        }
    }

    /// Combine parsed parts into a disjunction, flattening trivial cases.
    pub(crate) fn disjunction(mut parts: Vec<Constraint>) -> Constraint {
        match parts.len() {
            0 => Constraint::Any,
            1 => parts.remove(0),
            _ => Constraint::Or(parts),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Any => write!(f, "*"),
            Constraint::Comparison(op, version) => write!(f, "{} {}", op, version),
            Constraint::Caret(version) => write!(f, "^{}", version),
            Constraint::And(parts) => {
                let rendered: Vec<String> = parts.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", rendered.join(", "))
            }
            Constraint::Or(parts) => {
                let rendered: Vec<String> = parts.iter().map(|c| c.to_string()).collect();
                write!(f, "{}", rendered.join(" || "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn c(s: &str) -> Constraint {
        Constraint::parse(s).unwrap()
    }

    #[test]
    fn test_any_matches_everything() {
        assert!(c("*").matches(&v("0.0.1")));
        assert!(c("*").matches(&v("99.0")));
    }

    #[test]
    fn test_comparison_matches() {
        assert!(c(">= 1.8.1").matches(&v("1.8.1")));
        assert!(c(">= 1.8.1").matches(&v("2.0")));
        assert!(!c(">= 1.8.1").matches(&v("1.8.0")));
        assert!(c("< 2").matches(&v("1.9999.9999")));
        assert!(!c("< 2").matches(&v("2.0.0")));
        assert!(c("!= 1.5").matches(&v("1.5.1")));
        assert!(!c("!= 1.5").matches(&v("1.5.0")));
    }

    #[test]
    fn test_exact_matches_build_numbers() {
        assert!(c("== 1.8.1-2").matches(&v("1.8.1-2")));
        assert!(!c("== 1.8.1-2").matches(&v("1.8.1-1")));
        assert!(c("> 1.8.1-1").matches(&v("1.8.1-2")));
    }

    #[test]
    fn test_caret_matches() {
        assert!(c("^1.2").matches(&v("1.2.0")));
        assert!(c("^1.2").matches(&v("1.9.3")));
        assert!(!c("^1.2").matches(&v("2.0.0")));
        assert!(!c("^1.2").matches(&v("1.1.9")));

        assert!(c("^0.2.1").matches(&v("0.2.5")));
        assert!(!c("^0.2.1").matches(&v("0.3.0")));
    }

    #[test]
    fn test_conjunction_matches() {
        let range = c(">= 1.8.1-2, < 2");
        assert!(range.matches(&v("1.8.1-2")));
        assert!(range.matches(&v("1.9.0")));
        assert!(!range.matches(&v("2.0.0")));
        assert!(!range.matches(&v("1.8.1-1")));
    }

    #[test]
    fn test_disjunction_matches() {
        let either = c("< 1 || >= 2");
        assert!(either.matches(&v("0.9")));
        assert!(either.matches(&v("2.0")));
        assert!(!either.matches(&v("1.5")));
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["*", ">= 1.8.1-2, < 2", "^1.2", "< 1 || >= 2"] {
            assert_eq!(c(s).to_string(), s);
        }
    }
}
