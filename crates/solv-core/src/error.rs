use thiserror::Error;

use crate::solver::ProblemSet;

/// Crate-level error taxonomy.
///
/// Conflicts hit during search are consumed by conflict analysis and
/// backtracking; they never surface here. An unknown name in a request
/// is not an error either, it becomes an empty job rule and is reported
/// as unsatisfiable.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The request cannot be satisfied. Carries the rules explaining why.
    #[error("unsatisfiable request: {0}")]
    Unsatisfiable(ProblemSet),

    /// Malformed package data rejected at load time.
    #[error("invalid package record: {0}")]
    InvalidRecord(String),

    /// Package record JSON that does not parse at all.
    #[error("invalid catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<ProblemSet> for SolverError {
    fn from(problems: ProblemSet) -> Self {
        SolverError::Unsatisfiable(problems)
    }
}
