use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::parser::{parse_version, ParseError};

/// Pre-release tags, ordered from least to most mature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseTag {
    Dev,
    Alpha,
    Beta,
    Rc,
}

impl PreReleaseTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreReleaseTag::Dev => "dev",
            PreReleaseTag::Alpha => "alpha",
            PreReleaseTag::Beta => "beta",
            PreReleaseTag::Rc => "rc",
        }
    }
}

/// A pre-release marker such as `beta2` or `rc1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub tag: PreReleaseTag,
    pub number: u64,
}

/// An ordered version token.
///
/// A version is a dotted numeric release, optionally followed by a
/// pre-release marker and a build number, e.g. `1.8.1-2` (release
/// `1.8.1`, build `2`) or `2.0.0.rc1` (release `2.0.0`, pre-release
/// `rc1`).
///
/// Ordering compares the release segments numerically (missing segments
/// count as zero), then the pre-release marker (a final version sorts
/// after any pre-release of the same release), then the build number
/// (missing counts as zero). Equality and hashing follow the same
/// normalization, so `1.0` and `1.0.0` are equal and hash alike.
#[derive(Debug, Clone)]
pub struct Version {
    pub release: Vec<u64>,
    pub pre: Option<PreRelease>,
    pub build: Option<u64>,
}

impl Version {
    pub fn new(release: Vec<u64>, pre: Option<PreRelease>, build: Option<u64>) -> Self {
        Self { release, pre, build }
    }

    /// Parse a version string, e.g. `1.8.1-2`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        parse_version(input)
    }

    /// Release segment at `index`, treating missing segments as zero.
    fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// True if this is a pre-release version.
    pub fn is_pre_release(&self) -> bool {
        self.pre.is_some()
    }

    /// The version obtained by bumping the release segment at `index`
    /// and zeroing everything after it. Used for caret upper bounds.
    pub(crate) fn bumped(&self, index: usize) -> Version {
        let mut release: Vec<u64> = (0..=index).map(|i| self.segment(i)).collect();
        release[index] += 1;
        Version::new(release, None, None)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with Ord: trailing zero segments and a missing
        // build number carry no information.
        let trimmed = self.release.iter().rposition(|&s| s != 0).map_or(0, |i| i + 1);
        self.release[..trimmed].hash(state);
        self.pre.hash(state);
        self.build.unwrap_or(0).hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let segments = self.release.len().max(other.release.len());
        for i in 0..segments {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                other => return other,
            }
        }

        // A final release sorts after any of its pre-releases.
        let pre_cmp = match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        };
        if pre_cmp != Ordering::Equal {
            return pre_cmp;
        }

        self.build.unwrap_or(0).cmp(&other.build.unwrap_or(0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, ".{}{}", pre.tag.as_str(), pre.number)?;
        }
        if let Some(build) = self.build {
            write!(f, "-{}", build)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_ordering_release() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("1.9.0") < v("1.10.0"));
        assert!(v("1.0") == v("1.0.0"));
        assert!(v("2.0") > v("1.9999.9999"));
    }

    #[test]
    fn test_version_equality_agrees_with_ordering() {
        use std::collections::HashSet;

        // Anything that compares Equal must also be == and hash alike
        let pairs = [("1.0", "1.0.0"), ("2", "2.0.0.0"), ("1.8.1", "1.8.1-0")];
        for (a, b) in pairs {
            let (a, b) = (v(a), v(b));
            assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
            assert_eq!(a, b);

            let mut seen = HashSet::new();
            seen.insert(a);
            assert!(seen.contains(&b));
        }

        assert_ne!(v("1.0"), v("1.0.1"));
        assert_ne!(v("1.0"), v("1.0.0.rc1"));
    }

    #[test]
    fn test_version_ordering_pre_release() {
        assert!(v("1.0.0.alpha1") < v("1.0.0.beta1"));
        assert!(v("1.0.0.beta1") < v("1.0.0.beta2"));
        assert!(v("1.0.0.rc1") < v("1.0.0"));
        assert!(v("1.0.0") < v("1.0.1.rc1"));
    }

    #[test]
    fn test_version_ordering_build() {
        assert!(v("1.8.1-1") < v("1.8.1-2"));
        assert!(v("1.8.1") < v("1.8.1-2"));
        assert!(v("1.8.1-2") < v("1.8.2"));
    }

    #[test]
    fn test_version_display_round_trip() {
        for s in ["1.8.1-2", "2.0.0", "1.0.0.rc1", "0.23.4.beta1-1"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn test_version_bumped() {
        assert_eq!(v("1.2.3").bumped(0), v("2"));
        assert_eq!(v("1.2.3").bumped(1), v("1.3"));
        assert_eq!(v("0.2").bumped(1), v("0.3"));
    }
}
