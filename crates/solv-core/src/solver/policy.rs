use std::cmp::Ordering;
use std::collections::HashSet;

use super::pool::{PackageId, Pool};

/// Policy for selecting between candidate packages.
///
/// When multiple packages can satisfy a requirement, the policy
/// determines which one to try first. The comparison is a strict total
/// order per name, which makes solves deterministic and transactions
/// reproducible: installed candidates first (when `prefer_installed`),
/// then newest version (oldest under `prefer_lowest`), then smallest
/// pool id.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Keep what is already installed when possible
    pub prefer_installed: bool,
    /// Prefer lowest versions (for testing)
    pub prefer_lowest: bool,
    /// Ids of currently installed packages
    installed: HashSet<PackageId>,
}

impl Policy {
    pub fn new() -> Self {
        Self {
            prefer_installed: true,
            prefer_lowest: false,
            installed: HashSet::new(),
        }
    }

    pub fn prefer_installed(mut self, prefer: bool) -> Self {
        self.prefer_installed = prefer;
        self
    }

    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Record the installed set the policy should favor.
    pub fn with_installed(mut self, ids: impl IntoIterator<Item = PackageId>) -> Self {
        self.installed = ids.into_iter().collect();
        self
    }

    pub fn is_installed(&self, id: PackageId) -> bool {
        self.installed.contains(&id)
    }

    /// Strict total order over candidate ids; `Less` means "try first".
    pub fn compare(&self, pool: &Pool, a: PackageId, b: PackageId) -> Ordering {
        if self.prefer_installed {
            let a_installed = self.installed.contains(&a);
            let b_installed = self.installed.contains(&b);
            if a_installed != b_installed {
                return if a_installed {
                    Ordering::Less
                } else {
                    Ordering::Greater
                };
            }
        }

        if let (Some(pa), Some(pb)) = (pool.package(a), pool.package(b)) {
            let by_version = if self.prefer_lowest {
                pa.version.cmp(&pb.version)
            } else {
                pb.version.cmp(&pa.version)
            };
            if by_version != Ordering::Equal {
                return by_version;
            }
        }

        a.cmp(&b)
    }

    /// Candidates sorted by preference, best first.
    pub fn select_preferred(&self, pool: &Pool, candidates: &[PackageId]) -> Vec<PackageId> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|&a, &b| self.compare(pool, a, b));
        sorted
    }
}
