//! Version tokens and textual version constraints.
//!
//! This crate provides the version model used by the solv resolver: a
//! totally ordered version token (dotted release, optional pre-release
//! tag, optional build number) and a constraint expression language
//! combining comparison operators with AND/OR.

pub mod constraint;
mod parser;
mod version;

pub use constraint::{Constraint, Operator};
pub use parser::{parse_constraints, parse_version, ParseError};
pub use version::{PreRelease, PreReleaseTag, Version};
