//! Parsing of version tokens and constraint expressions.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::constraint::{Constraint, Operator};
use crate::version::{PreRelease, PreReleaseTag, Version};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid version: {0:?}")]
    InvalidVersion(String),
    #[error("invalid constraint: {0:?}")]
    InvalidConstraint(String),
}

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(
        r"(?i)^(\d+(?:\.\d+)*)(?:[._-]?(dev|alpha|a|beta|b|rc|c)\.?(\d*))?(?:-(\d+))?$"
    )
    .unwrap();

    // One constraint term: optional caret or comparison operator, then a
    // version token. Terms are separated by commas and/or whitespace.
    static ref TERM_RE: Regex = Regex::new(
        r"^(?:(\^)\s*|(>=|<=|==|!=|<|>|=)\s*)?([0-9][0-9a-zA-Z.\-_]*)"
    )
    .unwrap();
}

/// Parse a version string such as `1.8.1-2` or `2.0.0.rc1`.
pub fn parse_version(input: &str) -> Result<Version, ParseError> {
    let trimmed = input.trim();
    let captures = VERSION_RE
        .captures(trimmed)
        .ok_or_else(|| ParseError::InvalidVersion(input.to_string()))?;

    let release: Vec<u64> = captures[1]
        .split('.')
        .map(|s| s.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| ParseError::InvalidVersion(input.to_string()))?;

    let pre = match captures.get(2) {
        Some(tag) => {
            let tag = match tag.as_str().to_ascii_lowercase().as_str() {
                "dev" => PreReleaseTag::Dev,
                "alpha" | "a" => PreReleaseTag::Alpha,
                "beta" | "b" => PreReleaseTag::Beta,
                "rc" | "c" => PreReleaseTag::Rc,
                other => return Err(ParseError::InvalidVersion(other.to_string())),
            };
            let number = match captures.get(3) {
                Some(m) if !m.as_str().is_empty() => m
                    .as_str()
                    .parse::<u64>()
                    .map_err(|_| ParseError::InvalidVersion(input.to_string()))?,
                _ => 0,
            };
            Some(PreRelease { tag, number })
        }
        None => None,
    };

    let build = match captures.get(4) {
        Some(m) => Some(
            m.as_str()
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidVersion(input.to_string()))?,
        ),
        None => None,
    };

    Ok(Version::new(release, pre, build))
}

/// Parse a constraint expression.
///
/// Terms within one branch are conjoined (separated by commas and/or
/// whitespace); branches separated by `||` are disjoined. `*` or an
/// empty expression matches anything.
pub fn parse_constraints(input: &str) -> Result<Constraint, ParseError> {
    let branches: Vec<Constraint> = input
        .split("||")
        .map(parse_conjunction)
        .collect::<Result<_, _>>()?;

    Ok(Constraint::disjunction(branches))
}

fn parse_conjunction(branch: &str) -> Result<Constraint, ParseError> {
    let trimmed = branch.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Ok(Constraint::Any);
    }

    let mut parts = Vec::new();
    let mut rest = trimmed;

    while !rest.is_empty() {
        let captures = TERM_RE
            .captures(rest)
            .ok_or_else(|| ParseError::InvalidConstraint(branch.trim().to_string()))?;

        let version = parse_version(&captures[3])
            .map_err(|_| ParseError::InvalidConstraint(branch.trim().to_string()))?;

        let part = if captures.get(1).is_some() {
            Constraint::Caret(version)
        } else {
            let operator = match captures.get(2) {
                Some(op) => Operator::parse(op.as_str())
                    .map_err(|_| ParseError::InvalidConstraint(branch.trim().to_string()))?,
                // A bare version means an exact match.
                None => Operator::Equal,
            };
            Constraint::Comparison(operator, version)
        };
        parts.push(part);

        rest = rest[captures[0].len()..].trim_start_matches([' ', '\t', ',']);
    }

    Ok(Constraint::conjunction(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_plain() {
        let version = parse_version("1.8.1").unwrap();
        assert_eq!(version.release, vec![1, 8, 1]);
        assert_eq!(version.pre, None);
        assert_eq!(version.build, None);
    }

    #[test]
    fn test_parse_version_with_build() {
        let version = parse_version("1.8.1-2").unwrap();
        assert_eq!(version.release, vec![1, 8, 1]);
        assert_eq!(version.build, Some(2));
    }

    #[test]
    fn test_parse_version_pre_release() {
        let version = parse_version("2.0.0.rc1").unwrap();
        assert_eq!(version.pre, Some(PreRelease { tag: PreReleaseTag::Rc, number: 1 }));

        let version = parse_version("1.0.0-beta2").unwrap();
        assert_eq!(version.pre, Some(PreRelease { tag: PreReleaseTag::Beta, number: 2 }));
        assert_eq!(version.build, None);
    }

    #[test]
    fn test_parse_version_rejects_garbage() {
        assert!(parse_version("").is_err());
        assert!(parse_version("abc").is_err());
        assert!(parse_version("1.x.0").is_err());
    }

    #[test]
    fn test_parse_constraints_any() {
        assert!(parse_constraints("*").unwrap().is_any());
        assert!(parse_constraints("").unwrap().is_any());
        assert!(parse_constraints("  ").unwrap().is_any());
    }

    #[test]
    fn test_parse_constraints_single() {
        let constraint = parse_constraints(">= 1.8.1-2").unwrap();
        assert_eq!(
            constraint,
            Constraint::Comparison(Operator::GreaterThanOrEqual, parse_version("1.8.1-2").unwrap())
        );
    }

    #[test]
    fn test_parse_constraints_bare_version_is_exact() {
        let constraint = parse_constraints("1.8.1").unwrap();
        assert_eq!(
            constraint,
            Constraint::Comparison(Operator::Equal, parse_version("1.8.1").unwrap())
        );
    }

    #[test]
    fn test_parse_constraints_conjunction() {
        let with_comma = parse_constraints(">= 1.8.1, < 2").unwrap();
        let with_space = parse_constraints(">= 1.8.1 < 2").unwrap();
        assert_eq!(with_comma, with_space);
        assert!(matches!(with_comma, Constraint::And(ref parts) if parts.len() == 2));
    }

    #[test]
    fn test_parse_constraints_disjunction() {
        let constraint = parse_constraints("< 1 || >= 2, < 3").unwrap();
        match constraint {
            Constraint::Or(parts) => {
                assert_eq!(parts.len(), 2);
                assert!(matches!(parts[1], Constraint::And(_)));
            }
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_constraints_caret() {
        let constraint = parse_constraints("^1.2").unwrap();
        assert_eq!(constraint, Constraint::Caret(parse_version("1.2").unwrap()));
    }

    #[test]
    fn test_parse_constraints_rejects_garbage() {
        assert!(parse_constraints(">=").is_err());
        assert!(parse_constraints("~ 1.0").is_err());
        assert!(parse_constraints(">= foo").is_err());
    }
}
