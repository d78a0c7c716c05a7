use super::pool::PackageId;
use super::rule::Literal;

/// Tracks decisions made during SAT solving.
///
/// Each decision records:
/// - Whether a package is installed (+) or not installed (-)
/// - At what decision level it was decided
/// - Which rule forced the decision, if any
///
/// Uses a flat Vec indexed by PackageId for O(1) lookups. The
/// decision_map stores: 0 = undecided, >0 = installed at level N,
/// <0 = not installed at level -N. The trail is append-only except for
/// explicit backtracks.
#[derive(Debug)]
pub struct Decisions {
    /// Index is PackageId, value encodes both decision and level
    decision_map: Vec<i32>,

    /// Queue of decisions in order made [(literal, rule_id)]
    decision_queue: Vec<(Literal, Option<u32>)>,

    /// Current decision level
    level: u32,
}

impl Decisions {
    pub fn new() -> Self {
        Self {
            decision_map: Vec::new(),
            decision_queue: Vec::new(),
            level: 0,
        }
    }

    pub fn with_capacity(max_package_id: usize) -> Self {
        Self {
            decision_map: vec![0; max_package_id + 1],
            decision_queue: Vec::with_capacity(max_package_id),
            level: 0,
        }
    }

    #[inline]
    fn ensure_capacity(&mut self, package_id: PackageId) {
        let id = package_id as usize;
        if id >= self.decision_map.len() {
            self.decision_map.resize(id + 1, 0);
        }
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn increment_level(&mut self) {
        self.level += 1;
    }

    /// Make a decision at the current level.
    ///
    /// Returns false if this conflicts with an existing decision.
    pub fn decide(&mut self, literal: Literal, rule_id: Option<u32>) -> bool {
        let package_id = literal.unsigned_abs() as PackageId;
        self.ensure_capacity(package_id);

        let id = package_id as usize;
        let existing = self.decision_map[id];

        if existing != 0 {
            let was_installed = existing > 0;
            let want_installed = literal > 0;
            // Same polarity is a no-op, opposite is a conflict
            return was_installed == want_installed;
        }

        // Store level+1 so that level 0 doesn't become 0 (= undecided)
        let level_value = (self.level + 1) as i32;
        self.decision_map[id] = if literal > 0 { level_value } else { -level_value };
        self.decision_queue.push((literal, rule_id));

        true
    }

    /// Whether a literal is satisfied by current decisions
    #[inline]
    pub fn satisfied(&self, literal: Literal) -> bool {
        let id = literal.unsigned_abs() as usize;
        if id >= self.decision_map.len() {
            return false;
        }

        let decision = self.decision_map[id];
        if decision == 0 {
            return false;
        }

        (decision > 0) == (literal > 0)
    }

    /// Whether a literal's negation is already decided
    #[inline]
    pub fn conflicts_with(&self, literal: Literal) -> bool {
        let id = literal.unsigned_abs() as usize;
        if id >= self.decision_map.len() {
            return false;
        }

        let decision = self.decision_map[id];
        if decision == 0 {
            return false;
        }

        (decision > 0) != (literal > 0)
    }

    /// Whether a package has been decided either way
    #[inline]
    pub fn decided(&self, package_id: PackageId) -> bool {
        let id = package_id as usize;
        id < self.decision_map.len() && self.decision_map[id] != 0
    }

    #[inline]
    pub fn undecided(&self, package_id: PackageId) -> bool {
        !self.decided(package_id)
    }

    /// Whether a package was decided to be installed
    #[inline]
    pub fn decided_install(&self, package_id: PackageId) -> bool {
        let id = package_id as usize;
        id < self.decision_map.len() && self.decision_map[id] > 0
    }

    /// Decision level for a literal's package, if decided
    #[inline]
    pub fn decision_level(&self, literal: Literal) -> Option<u32> {
        let id = literal.unsigned_abs() as usize;
        if id >= self.decision_map.len() {
            return None;
        }

        let decision = self.decision_map[id];
        if decision == 0 {
            None
        } else {
            // We stored level+1
            Some(decision.unsigned_abs() - 1)
        }
    }

    /// The rule that forced a decision, for conflict analysis
    pub fn decision_rule(&self, literal: Literal) -> Option<u32> {
        let package_id = literal.unsigned_abs() as PackageId;

        for &(lit, rule_id) in &self.decision_queue {
            if lit.unsigned_abs() as PackageId == package_id {
                return rule_id;
            }
        }
        None
    }

    /// Revert all decisions at levels > target_level, returning the
    /// discarded literals in trail order.
    pub fn revert_to_level(&mut self, target_level: u32) -> Vec<Literal> {
        let target = (target_level + 1) as i32;

        for decision in &mut self.decision_map {
            if *decision != 0 && (decision.unsigned_abs() as i32) > target {
                *decision = 0;
            }
        }

        let decision_map = &self.decision_map;
        let mut discarded = Vec::new();
        self.decision_queue.retain(|&(literal, _)| {
            let id = literal.unsigned_abs() as usize;
            let keep = id < decision_map.len() && decision_map[id] != 0;
            if !keep {
                discarded.push(literal);
            }
            keep
        });

        self.level = target_level;
        discarded
    }

    /// All packages decided to be installed
    pub fn installed_packages(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.decision_map
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .map(|(id, _)| id as PackageId)
    }

    pub fn queue(&self) -> &[(Literal, Option<u32>)] {
        &self.decision_queue
    }

    pub fn len(&self) -> usize {
        self.decision_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decision_queue.is_empty()
    }
}

impl Default for Decisions {
    fn default() -> Self {
        Self::new()
    }
}
