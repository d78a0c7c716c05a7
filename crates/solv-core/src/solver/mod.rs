//! SAT-based dependency resolver.
//!
//! This module implements a CDCL (Conflict-Driven Clause Learning) SAT
//! solver specifically designed for package dependency resolution.
//!
//! # Architecture
//!
//! The solver consists of several key components:
//!
//! - [`Pool`]: Registry of all available packages with lookup by name/constraint
//! - [`Request`]: Specification of what needs to be resolved
//! - [`RuleSet`]: Collection of SAT clauses representing dependencies
//! - [`Policy`]: Preference order over candidate versions
//! - [`Solver`]: The main CDCL algorithm implementation
//! - [`Transaction`]: Ordered install/remove operations of a solution
//!
//! # Algorithm Overview
//!
//! 1. **Rule Generation**: Convert the dependency graph to SAT clauses
//! 2. **Unit Propagation**: Force decisions from unit clauses via two
//!    watched literals
//! 3. **Decision Making**: Choose package versions using the policy
//! 4. **Conflict Analysis**: Learn from conflicts to avoid repeating mistakes
//! 5. **Backtracking**: Revert to the appropriate level on conflict
//!
//! # Example
//!
//! ```
//! use solv_core::solver::{Policy, Pool, Request, Solver};
//! use solv_version::Constraint;
//!
//! let pool = Pool::new();
//! // ... add repositories to the pool
//!
//! let mut request = Request::new();
//! request.install("numpy", Constraint::Any);
//!
//! let policy = Policy::new();
//! let solver = Solver::new(&pool, &policy);
//!
//! match solver.solve(&request) {
//!     Ok(transaction) => println!("{}", transaction.summary()),
//!     Err(problems) => println!("{}", problems.describe(&pool)),
//! }
//! ```

mod decisions;
mod policy;
mod pool;
mod problem;
mod request;
mod rule;
mod rule_generator;
mod rule_set;
mod solver;
mod transaction;
mod watch_graph;

#[cfg(test)]
mod tests;

pub use decisions::Decisions;
pub use policy::Policy;
pub use pool::{PackageId, Pool};
pub use problem::{Problem, ProblemRule, ProblemSet};
pub use request::{Job, JobKind, Request};
pub use rule::{Literal, Rule, RuleType};
pub use rule_generator::RuleGenerator;
pub use rule_set::{RuleSet, RuleSetStats};
pub use solver::Solver;
pub use transaction::{Operation, Transaction, TransactionSummary};
pub use watch_graph::{PropagateResult, Propagator, WatchGraph};
