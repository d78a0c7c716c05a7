//! Version constraint expressions.

mod constraint;
mod operator;

pub use constraint::Constraint;
pub use operator::Operator;
