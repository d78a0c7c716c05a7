use std::collections::{HashMap, HashSet, VecDeque};

use super::pool::{PackageId, Pool};
use super::request::{JobKind, Request};
use super::rule::Rule;
use super::rule_set::RuleSet;

/// Generates SAT rules from a dependency graph.
///
/// This converts the request and the package relationships reachable
/// from it into SAT clauses:
/// - Job rules: at least one candidate of each install job must be
///   installed; removed and superseded packages must not be
/// - Requires: if A is installed, then one of its providers must be
/// - Conflicts: A and a matching B cannot both be installed
/// - Same-name: two versions of one name cannot both be installed
///
/// Traversal is a transitive closure over the requires graph starting
/// from job candidates and the installed set, with a visited set so
/// cyclic requires terminate.
pub struct RuleGenerator<'a> {
    pool: &'a Pool,
    /// Ids of currently installed packages
    installed: &'a [PackageId],
    rules: RuleSet,
    /// Packages whose rules have been emitted
    added_packages: HashSet<PackageId>,
    /// Reached packages grouped by name, for same-name rules
    added_packages_by_name: HashMap<String, Vec<PackageId>>,
}

impl<'a> RuleGenerator<'a> {
    pub fn new(pool: &'a Pool, installed: &'a [PackageId]) -> Self {
        Self {
            pool,
            installed,
            rules: RuleSet::new(),
            added_packages: HashSet::new(),
            added_packages_by_name: HashMap::new(),
        }
    }

    /// Generate all rules for a request.
    pub fn generate(mut self, request: &Request) -> RuleSet {
        // Job rules first, in submission order, so dedup keeps job
        // provenance on rules shared with the package traversal.
        for job in request.jobs() {
            match job.kind {
                JobKind::Install => self.add_install_job_rules(job),
                JobKind::Remove => self.add_remove_job_rules(job),
                JobKind::Update => self.add_update_job_rules(job),
            }
        }
        log::debug!("after job rules: {} rules", self.rules.len());

        // Installed packages keep their relationship rules so removals
        // and updates propagate through the rest of the installed set.
        for &id in self.installed {
            self.add_package_rules(id);
        }
        log::debug!(
            "after package rules: {} rules, {} packages reached",
            self.rules.len(),
            self.added_packages.len()
        );

        self.add_same_name_rules();

        log::debug!("rule generation stats: {:?}", self.rules.stats());
        self.rules
    }

    /// Install(name, c): one candidate must be installed. No candidates
    /// yields the empty rule, the designed "package not found" signal.
    fn add_install_job_rules(&mut self, job: &super::request::Job) {
        let candidates = self.pool.what_provides(&job.name, Some(&job.constraint));
        if candidates.is_empty() {
            log::warn!("no candidates satisfy job '{}'", job);
        }

        let rule = Rule::job_install(candidates.clone())
            .with_target(&job.name)
            .with_constraint(job.constraint.to_string());
        self.rules.add(rule);

        for id in candidates {
            self.add_package_rules(id);
        }
    }

    /// Remove(name): every candidate of that name must be absent.
    fn add_remove_job_rules(&mut self, job: &super::request::Job) {
        for id in self.pool.what_provides(&job.name, None) {
            let rule = Rule::job_remove(id).with_target(&job.name);
            self.rules.add(rule);
        }
    }

    /// Update(name, c): behaves as Install, and additionally forces out
    /// installed versions of the name that do not satisfy the
    /// constraint.
    fn add_update_job_rules(&mut self, job: &super::request::Job) {
        self.add_install_job_rules(job);

        for &id in self.installed {
            let Some(record) = self.pool.package(id) else {
                continue;
            };
            if record.name != job.name {
                continue;
            }
            if !job.constraint.matches(&record.version) {
                let rule = Rule::job_update_remove(id)
                    .with_target(&job.name)
                    .with_constraint(job.constraint.to_string());
                self.rules.add(rule);
            }
        }
    }

    /// Emit requires and conflict rules for a package and everything
    /// transitively reachable from it over the requires graph.
    fn add_package_rules(&mut self, package_id: PackageId) {
        let mut work_queue = VecDeque::new();
        work_queue.push_back(package_id);

        while let Some(id) = work_queue.pop_front() {
            if !self.added_packages.insert(id) {
                continue;
            }

            let Some(record) = self.pool.package(id) else {
                continue;
            };
            let record = record.clone();

            self.added_packages_by_name
                .entry(record.name.clone())
                .or_default()
                .push(id);

            for dep in &record.requires {
                let providers = self.pool.what_provides(&dep.name, Some(&dep.constraint));
                if providers.is_empty() {
                    log::warn!(
                        "no candidates for requirement '{}' of {}",
                        dep,
                        record.pretty_string()
                    );
                }

                // Empty providers leave the bare (-id) unit: selecting
                // this package is then unsatisfiable.
                let rule = Rule::requires(id, providers.clone())
                    .with_source(id)
                    .with_target(&dep.name)
                    .with_constraint(dep.constraint.to_string());
                self.rules.add(rule);

                work_queue.extend(providers);
            }

            for dep in &record.conflicts {
                for conflict_id in self.pool.what_provides(&dep.name, Some(&dep.constraint)) {
                    if conflict_id != id {
                        let rule = Rule::conflict(id, conflict_id)
                            .with_source(id)
                            .with_target(&dep.name);
                        self.rules.add(rule);
                    }
                }
            }
        }
    }

    /// Pairwise same-name rules for every reached name with more than
    /// one candidate: at most one version of a name can be installed.
    fn add_same_name_rules(&mut self) {
        let mut groups: Vec<(&String, &Vec<PackageId>)> = self
            .added_packages_by_name
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .collect();
        groups.sort_by_key(|(name, _)| name.as_str());

        let mut pairs = Vec::new();
        for (name, ids) in groups {
            for (i, &a) in ids.iter().enumerate() {
                for &b in &ids[i + 1..] {
                    pairs.push((name.clone(), a, b));
                }
            }
        }

        for (name, a, b) in pairs {
            let rule = Rule::same_name(a, b).with_target(name);
            self.rules.add(rule);
        }
    }
}
