use super::decisions::Decisions;
use super::policy::Policy;
use super::pool::{PackageId, Pool};
use super::problem::{Problem, ProblemSet};
use super::request::Request;
use super::rule::{Literal, Rule, RuleType};
use super::rule_generator::RuleGenerator;
use super::rule_set::RuleSet;
use super::transaction::Transaction;
use super::watch_graph::{PropagateResult, Propagator, WatchGraph};

/// The main SAT solver for dependency resolution.
///
/// Implements a CDCL (Conflict-Driven Clause Learning) algorithm
/// adapted for package dependency resolution.
pub struct Solver<'a> {
    /// Package pool
    pool: &'a Pool,
    /// Selection policy
    policy: &'a Policy,
    /// Ids currently installed, in install order
    installed: Vec<PackageId>,
}

impl<'a> Solver<'a> {
    /// Create a new solver over an empty installed set
    pub fn new(pool: &'a Pool, policy: &'a Policy) -> Self {
        Self {
            pool,
            policy,
            installed: Vec::new(),
        }
    }

    /// Set the currently installed package ids.
    ///
    /// These seed rule generation and are diffed against the final
    /// assignment when the transaction is built.
    pub fn with_installed(mut self, installed: impl IntoIterator<Item = PackageId>) -> Self {
        self.installed = installed.into_iter().collect();
        self
    }

    /// Solve the dependency resolution problem.
    ///
    /// Returns a Transaction on success, or a ProblemSet explaining failures.
    pub fn solve(&self, request: &Request) -> Result<Transaction, ProblemSet> {
        let start = std::time::Instant::now();

        // Generate rules from the dependency graph
        let generator = RuleGenerator::new(self.pool, &self.installed);
        let rules = generator.generate(request);

        log::debug!(
            "rule generation: {:?}, {} rules",
            start.elapsed(),
            rules.len()
        );

        let mut state = SolverState::new(rules, self.pool.len());
        let sat_start = std::time::Instant::now();

        match self.run_sat(&mut state) {
            Ok(()) => {
                log::debug!("sat solving: {:?}", sat_start.elapsed());
                Ok(Transaction::from_decisions(
                    self.pool,
                    &state.decisions,
                    &self.installed,
                ))
            }
            Err(problems) => {
                log::debug!("sat solving (failed): {:?}", sat_start.elapsed());
                Err(problems)
            }
        }
    }

    /// Main SAT solving loop
    fn run_sat(&self, state: &mut SolverState) -> Result<(), ProblemSet> {
        // Process assertion rules first (single-literal rules)
        self.process_assertions(state)?;

        // Iteration counter for detecting infinite loops
        let mut iterations = 0u32;
        const MAX_ITERATIONS: u32 = 100_000;

        loop {
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                let mut problems = ProblemSet::new();
                problems.add(Problem::new().with_message("solver exceeded maximum iterations"));
                return Err(problems);
            }

            // Propagate all consequences of current decisions
            if let Err(conflict_rule) = self.propagate(state) {
                if state.decisions.level() == 1 {
                    // Conflict at level 1 means unsolvable
                    let mut problems = ProblemSet::new();
                    problems.add(self.analyze_unsolvable(state, conflict_rule));
                    return Err(problems);
                }

                // Try an alternative at the current branch point before
                // falling back to clause learning
                let current_level = state.decisions.level();
                let mut tried_alternative = false;

                if let Some(branch_idx) = state
                    .branches
                    .iter()
                    .position(|b| b.level == current_level && !b.alternatives.is_empty())
                {
                    let alternative = state.branches[branch_idx].alternatives.remove(0);

                    if state.decisions.undecided(alternative) {
                        state.decisions.revert_to_level(current_level - 1);
                        state.reset_propagate_index();
                        state.decisions.increment_level();

                        state.decisions.decide(alternative, None);
                        tried_alternative = true;
                    }

                    if state.branches[branch_idx].alternatives.is_empty() {
                        state.branches.remove(branch_idx);
                    }
                }

                if !tried_alternative {
                    // No alternatives available, use CDCL learning
                    let (learned_literal, backtrack_level, learned_rule) =
                        self.analyze_conflict(state, conflict_rule);

                    state.decisions.revert_to_level(backtrack_level);
                    state.reset_propagate_index();
                    state.branches.retain(|b| b.level <= backtrack_level);

                    if !learned_rule.literals().is_empty() {
                        let learned_id = state.rules.add(learned_rule);
                        if let Some(rule) = state.rules.get(learned_id) {
                            state.watch_graph.add_rule(rule);
                        }

                        state.decisions.decide(learned_literal, Some(learned_id));
                    }
                }
                continue;
            }

            // Find the next undecided requirement to branch on
            match self.select_next(state) {
                Some(candidates) => {
                    let sorted = self.policy.select_preferred(self.pool, &candidates);

                    if sorted.is_empty() {
                        continue;
                    }

                    // Increment decision level for branching
                    state.decisions.increment_level();

                    let selected = sorted[0];

                    // Record branch point for backtracking
                    if sorted.len() > 1 {
                        state.branches.push(Branch {
                            level: state.decisions.level(),
                            alternatives: sorted[1..].to_vec(),
                        });
                    }

                    state.decisions.decide(selected, None);
                }
                None => {
                    // No more undecided requirements - solution found
                    return Ok(());
                }
            }
        }
    }

    /// Process assertion rules (single-literal rules that must be true).
    /// Also checks for empty rules, which signal a requirement no
    /// package can satisfy.
    fn process_assertions(&self, state: &mut SolverState) -> Result<(), ProblemSet> {
        state.decisions.increment_level(); // Level 1 for assertions

        for rule in state.rules.iter() {
            if rule.is_empty() {
                let mut problems = ProblemSet::new();
                let mut problem = Problem::new();
                problem.add_rule(rule);
                problems.add(problem);
                return Err(problems);
            }
        }

        let assertion_ids: Vec<u32> = state.rules.assertions().map(|r| r.id()).collect();
        for rule_id in assertion_ids {
            let Some(rule) = state.rules.get(rule_id) else {
                continue;
            };
            let literal = rule.literals()[0];

            if state.decisions.conflicts_with(literal) {
                // Two assertions disagree; report both so the conflict
                // is traceable to its jobs
                let mut problems = ProblemSet::new();
                let mut problem = Problem::new();
                problem.add_rule(rule);
                if let Some(cause_id) = state.decisions.decision_rule(literal) {
                    if let Some(cause) = state.rules.get(cause_id) {
                        problem.add_rule(cause);
                    }
                }
                problems.add(problem);
                return Err(problems);
            }

            if !state.decisions.satisfied(literal) {
                state.decisions.decide(literal, Some(rule_id));
            }
        }

        Ok(())
    }

    /// Propagate consequences of current decisions using unit propagation.
    /// propagate_index avoids re-processing already propagated decisions.
    fn propagate(&self, state: &mut SolverState) -> Result<(), u32> {
        while state.propagate_index < state.decisions.len() {
            let (literal, _) = state.decisions.queue()[state.propagate_index];
            state.propagate_index += 1;

            let is_satisfied = |lit: Literal| -> Option<bool> {
                let pkg_id = lit.unsigned_abs() as PackageId;
                if state.decisions.decided(pkg_id) {
                    Some(state.decisions.satisfied(lit))
                } else {
                    None
                }
            };

            // Limit the mutable borrow of the watch graph
            let results = {
                let mut propagator = Propagator::new(&mut state.watch_graph, &state.rules);
                propagator.propagate(literal, is_satisfied)
            };

            for result in results {
                match result {
                    PropagateResult::Ok => {}
                    PropagateResult::Unit(unit_lit, rule_id) => {
                        if state.decisions.conflicts_with(unit_lit) {
                            return Err(rule_id);
                        }
                        if !state.decisions.satisfied(unit_lit) {
                            state.decisions.decide(unit_lit, Some(rule_id));
                        }
                    }
                    PropagateResult::Conflict(rule_id) => {
                        return Err(rule_id);
                    }
                }
            }
        }

        Ok(())
    }

    /// Select the next unfulfilled requirement to branch on.
    ///
    /// Scans rules in creation order: install jobs first (they come
    /// first in the rule set), then requires rules whose source is
    /// decided installed.
    fn select_next(&self, state: &SolverState) -> Option<Vec<PackageId>> {
        for rule in state.rules.as_slice() {
            let rule_type = rule.rule_type();
            let literals = rule.literals();

            // Install jobs are all-positive: any candidate satisfies
            if rule_type == RuleType::JobInstall {
                let mut decision_queue = Vec::new();
                let mut none_satisfied = true;

                for &lit in literals {
                    if state.decisions.satisfied(lit) {
                        none_satisfied = false;
                        break;
                    }
                    if lit > 0 && state.decisions.undecided(lit as PackageId) {
                        decision_queue.push(lit as PackageId);
                    }
                }

                if none_satisfied && !decision_queue.is_empty() {
                    return Some(decision_queue);
                }
                continue;
            }

            if rule_type == RuleType::Requires {
                // Shape is (-source, target1, target2, ...); the rule
                // only fires once the source is decided installed
                let Some(&source_lit) = literals.first() else {
                    continue;
                };
                if source_lit >= 0 {
                    continue;
                }
                let source_id = -source_lit as PackageId;
                if !state.decisions.decided_install(source_id) {
                    continue;
                }

                let mut decision_queue = Vec::new();

                for &lit in &literals[1..] {
                    if state.decisions.satisfied(lit) {
                        decision_queue.clear();
                        break;
                    }
                    if lit > 0 && state.decisions.undecided(lit as PackageId) {
                        decision_queue.push(lit as PackageId);
                    }
                }

                if !decision_queue.is_empty() {
                    return Some(decision_queue);
                }
            }
        }

        None
    }

    /// Analyze a conflict to generate a learned clause using the
    /// first-UIP scheme
    fn analyze_conflict(&self, state: &SolverState, conflict_rule_id: u32) -> (Literal, u32, Rule) {
        let current_level = state.decisions.level();

        let mut seen = std::collections::HashSet::new();
        let mut learned_literals = Vec::new();
        let mut backtrack_level = 0u32;
        let mut literals_at_current_level = 0;

        // Start with the conflicting rule
        let mut to_process: Vec<Literal> = Vec::new();
        if let Some(rule) = state.rules.get(conflict_rule_id) {
            to_process.extend_from_slice(rule.literals());
        }

        // Resolution until exactly one literal at the current level remains
        while let Some(lit) = to_process.pop() {
            let pkg_id = lit.unsigned_abs() as PackageId;

            if !seen.insert(pkg_id) {
                continue;
            }

            if let Some(level) = state.decisions.decision_level(lit) {
                if level == 0 {
                    continue;
                }

                if level == current_level {
                    // Propagated literals get resolved with their reason
                    if let Some(reason_rule_id) = state.decisions.decision_rule(lit) {
                        if literals_at_current_level > 0 {
                            if let Some(reason_rule) = state.rules.get(reason_rule_id) {
                                for &reason_lit in reason_rule.literals() {
                                    let reason_pkg = reason_lit.unsigned_abs() as PackageId;
                                    if reason_pkg != pkg_id && !seen.contains(&reason_pkg) {
                                        to_process.push(reason_lit);
                                    }
                                }
                            }
                            continue;
                        }
                    }
                    literals_at_current_level += 1;
                    learned_literals.push(-lit);
                } else {
                    backtrack_level = backtrack_level.max(level);
                    learned_literals.push(-lit);
                }
            }
        }

        // No proper UIP found: negate the last decision at this level
        if learned_literals.is_empty() {
            for &(lit, _) in state.decisions.queue().iter().rev() {
                if state.decisions.decision_level(lit) == Some(current_level) {
                    learned_literals.push(-lit);
                    break;
                }
            }
            backtrack_level = current_level.saturating_sub(1);
        }

        // Always backtrack at least one level, never past the assertions
        if backtrack_level >= current_level {
            backtrack_level = current_level.saturating_sub(1);
        }
        if backtrack_level == 0 && current_level > 1 {
            backtrack_level = 1;
        }

        let learned_literal = learned_literals.first().copied().unwrap_or(1);
        let learned_rule = Rule::learned(learned_literals);

        (learned_literal, backtrack_level, learned_rule)
    }

    /// Explain a conflict that surfaced at level 1.
    ///
    /// Follows the implication chain to a fixed point: every decision
    /// at level 1 has a reason rule, so the collected rules alone
    /// reproduce the conflict and are jointly unsatisfiable.
    fn analyze_unsolvable(&self, state: &SolverState, conflict_rule_id: u32) -> Problem {
        let mut problem = Problem::new();
        let mut seen = std::collections::HashSet::new();
        let mut to_visit = vec![conflict_rule_id];

        while let Some(rule_id) = to_visit.pop() {
            if !seen.insert(rule_id) {
                continue;
            }
            let Some(rule) = state.rules.get(rule_id) else {
                continue;
            };
            problem.add_rule(rule);

            for &lit in rule.literals() {
                if let Some(cause_id) = state.decisions.decision_rule(lit) {
                    to_visit.push(cause_id);
                }
            }
        }

        problem
    }
}

/// Internal state for the solver
struct SolverState {
    /// SAT rules
    rules: RuleSet,
    /// Current decisions
    decisions: Decisions,
    /// Watch graph for propagation
    watch_graph: WatchGraph,
    /// Branch points for backtracking
    branches: Vec<Branch>,
    /// Index of next decision to propagate (avoids re-propagating)
    propagate_index: usize,
}

impl SolverState {
    fn new(rules: RuleSet, package_count: usize) -> Self {
        let watch_graph = WatchGraph::from_rules(&rules);

        Self {
            rules,
            decisions: Decisions::with_capacity(package_count),
            watch_graph,
            branches: Vec::new(),
            propagate_index: 0,
        }
    }

    /// Reset propagate_index after backtracking
    fn reset_propagate_index(&mut self) {
        self.propagate_index = self.decisions.len();
    }
}

/// A branch point for backtracking
struct Branch {
    /// Decision level at this branch
    level: u32,
    /// Alternative packages to try
    alternatives: Vec<PackageId>,
}
