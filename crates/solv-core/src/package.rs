use std::fmt;

use solv_version::{Constraint, Version};

/// A named relationship of a package: a requirement, a conflict, or a
/// provided/replaced name, together with a version constraint.
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Target name, stored lowercase.
    pub name: String,
    /// Constraint on the target's version.
    pub constraint: Constraint,
}

impl Dependency {
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into().to_lowercase(),
            constraint,
        }
    }

    /// A dependency on any version of a name.
    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, Constraint::Any)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraint.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.constraint)
        }
    }
}

/// Immutable description of one installable unit and its relationships.
///
/// Records are created once per resolution run from external catalogs
/// and never change after the pool has been built.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    /// Package name, stored lowercase.
    pub name: String,
    /// Ordered version token.
    pub version: Version,
    /// Packages this one needs installed alongside it.
    pub requires: Vec<Dependency>,
    /// Packages this one cannot coexist with.
    pub conflicts: Vec<Dependency>,
    /// Virtual names this package satisfies.
    pub provides: Vec<Dependency>,
    /// Names this package supersedes entirely.
    pub replaces: Vec<Dependency>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into().to_lowercase(),
            version,
            requires: Vec::new(),
            conflicts: Vec::new(),
            provides: Vec::new(),
            replaces: Vec::new(),
        }
    }

    pub fn with_require(mut self, dependency: Dependency) -> Self {
        self.requires.push(dependency);
        self
    }

    pub fn with_conflict(mut self, dependency: Dependency) -> Self {
        self.conflicts.push(dependency);
        self
    }

    pub fn with_provide(mut self, dependency: Dependency) -> Self {
        self.provides.push(dependency);
        self
    }

    pub fn with_replace(mut self, dependency: Dependency) -> Self {
        self.replaces.push(dependency);
        self
    }

    /// All names this record can stand in for: its own name plus
    /// everything it provides or replaces.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.provides.iter().map(|d| d.name.as_str()))
            .chain(self.replaces.iter().map(|d| d.name.as_str()))
    }

    /// `name-version` rendering used in diagnostics and transactions.
    pub fn pretty_string(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

impl fmt::Display for PackageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_record_new() {
        let record = PackageRecord::new("Numpy", v("1.8.1-2"));
        assert_eq!(record.name, "numpy");
        assert_eq!(record.pretty_string(), "numpy-1.8.1-2");
    }

    #[test]
    fn test_record_all_names() {
        let record = PackageRecord::new("mkl", v("10.3-1"))
            .with_provide(Dependency::any("blas"))
            .with_replace(Dependency::any("mkl-legacy"));

        let names: Vec<_> = record.all_names().collect();
        assert_eq!(names, vec!["mkl", "blas", "mkl-legacy"]);
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("mkl", Constraint::parse(">= 10.3").unwrap());
        assert_eq!(dep.to_string(), "mkl >= 10.3");
        assert_eq!(Dependency::any("mkl").to_string(), "mkl");
    }
}
