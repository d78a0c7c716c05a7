//! SAT-based package dependency resolution.
//!
//! Given a pool of package records and a request (install, remove,
//! update jobs), the solver produces an ordered transaction of
//! install and remove operations, or a set of problems explaining
//! why no solution exists.

pub mod error;
pub mod package;
pub mod repository;
pub mod solver;

pub use error::SolverError;
pub use package::{Dependency, PackageRecord};
pub use repository::Repository;
pub use solver::{Policy, Pool, Request, Solver, Transaction};
