use std::fmt;

use solv_version::Constraint;

/// What a single job asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Install,
    Remove,
    Update,
}

/// One install/remove/update directive against a pool.
#[derive(Debug, Clone)]
pub struct Job {
    pub kind: JobKind,
    /// Target name, stored lowercase
    pub name: String,
    /// Version constraint; `Any` for remove jobs
    pub constraint: Constraint,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            JobKind::Install => "install",
            JobKind::Remove => "remove",
            JobKind::Update => "update",
        };
        if self.constraint.is_any() {
            write!(f, "{} {}", verb, self.name)
        } else {
            write!(f, "{} {} {}", verb, self.name, self.constraint)
        }
    }
}

/// A request specifies what needs to be resolved: an ordered list of
/// jobs issued against a pool.
///
/// No validation against the pool happens here; an install job on an
/// unknown name surfaces during rule generation as an empty, trivially
/// unsatisfiable job rule.
#[derive(Debug, Clone, Default)]
pub struct Request {
    jobs: Vec<Job>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a package satisfying `constraint` to be installed.
    pub fn install(&mut self, name: impl Into<String>, constraint: Constraint) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Install,
            name: name.into().to_lowercase(),
            constraint,
        });
        self
    }

    /// Ask for every version of `name` to be absent.
    pub fn remove(&mut self, name: impl Into<String>) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Remove,
            name: name.into().to_lowercase(),
            constraint: Constraint::Any,
        });
        self
    }

    /// Ask for `name` to be moved to a version satisfying `constraint`.
    pub fn update(&mut self, name: impl Into<String>, constraint: Constraint) -> &mut Self {
        self.jobs.push(Job {
            kind: JobKind::Update,
            name: name.into().to_lowercase(),
            constraint,
        });
        self
    }

    /// Jobs in submission order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
