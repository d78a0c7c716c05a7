use super::rule::{Literal, Rule};
use super::rule_set::RuleSet;

/// Two-watched literals graph for efficient unit propagation.
///
/// Each non-assertion rule watches exactly 2 of its literals. When a
/// watched literal becomes false, we try to find another literal to
/// watch. This keeps propagation work proportional to the rules
/// actually touched by an assignment instead of rescanning every rule.
#[derive(Debug)]
pub struct WatchGraph {
    /// Maps literal index -> list of (rule_id, other_watched_literal).
    /// Index is mapped from literal using literal_to_index.
    watches: Vec<Vec<WatchNode>>,
}

/// A watch node linking a rule to a watched literal
#[derive(Debug, Clone, Copy)]
pub(crate) struct WatchNode {
    rule_id: u32,
    /// The other watched literal in this rule
    other_watch: Literal,
}

impl WatchGraph {
    pub fn new() -> Self {
        Self {
            watches: Vec::new(),
        }
    }

    /// Convert literal to index (handles positive and negative literals)
    fn literal_to_index(literal: Literal) -> usize {
        let abs = literal.unsigned_abs() as usize;
        if literal > 0 {
            abs * 2
        } else {
            abs * 2 + 1
        }
    }

    fn get_watches_mut(&mut self, literal: Literal) -> &mut Vec<WatchNode> {
        let idx = Self::literal_to_index(literal);
        if idx >= self.watches.len() {
            self.watches.resize(idx + 1, Vec::new());
        }
        &mut self.watches[idx]
    }

    /// Build the watch graph from a rule set
    pub fn from_rules(rules: &RuleSet) -> Self {
        let mut graph = Self::new();

        for rule in rules.iter() {
            graph.add_rule(rule);
        }

        graph
    }

    /// Add a rule to the graph; assertions and empty rules get no watches
    pub fn add_rule(&mut self, rule: &Rule) {
        let literals = rule.literals();
        if literals.len() < 2 {
            return;
        }

        let rule_id = rule.id();
        let watch1 = literals[0];
        let watch2 = literals[1];

        self.get_watches_mut(watch1).push(WatchNode {
            rule_id,
            other_watch: watch2,
        });
        self.get_watches_mut(watch2).push(WatchNode {
            rule_id,
            other_watch: watch1,
        });
    }

    /// Rules watching a specific literal
    pub(crate) fn get_watches(&self, literal: Literal) -> &[WatchNode] {
        let idx = Self::literal_to_index(literal);
        if idx < self.watches.len() {
            &self.watches[idx]
        } else {
            &[]
        }
    }

    fn remove_watch(&mut self, literal: Literal, rule_id: u32) {
        let idx = Self::literal_to_index(literal);
        if idx < self.watches.len() {
            self.watches[idx].retain(|w| w.rule_id != rule_id);
        }
    }

    /// Move a watch from one literal to another
    pub fn move_watch(&mut self, rule_id: u32, from: Literal, to: Literal, other: Literal) {
        self.remove_watch(from, rule_id);
        self.get_watches_mut(to).push(WatchNode {
            rule_id,
            other_watch: other,
        });
    }
}

impl Default for WatchGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of propagating a literal through one watching rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagateResult {
    /// Rule satisfied or watch moved, nothing forced
    Ok,
    /// A new unit was found that must be propagated
    Unit(Literal, u32),
    /// All literals of the rule are false
    Conflict(u32),
}

/// Propagator handles unit propagation using the watch graph
#[derive(Debug)]
pub struct Propagator<'a> {
    graph: &'a mut WatchGraph,
    rules: &'a RuleSet,
}

impl<'a> Propagator<'a> {
    pub fn new(graph: &'a mut WatchGraph, rules: &'a RuleSet) -> Self {
        Self { graph, rules }
    }

    /// Propagate a decided literal through the watch graph.
    ///
    /// When literal L is decided, rules watching -L may become unit or
    /// violated. For each such rule, if the other watched literal is:
    /// - True: rule is satisfied
    /// - Undecided: potential unit propagation
    /// - False: we need to find a new literal to watch, or conflict
    pub fn propagate<F>(&mut self, literal: Literal, mut is_satisfied: F) -> Vec<PropagateResult>
    where
        F: FnMut(Literal) -> Option<bool>, // None = undecided
    {
        let mut results = Vec::new();

        // Rules watch the literal that just became false
        let false_literal = -literal;

        let watches: Vec<_> = self.graph.get_watches(false_literal).to_vec();

        for watch in watches {
            let Some(rule) = self.rules.get(watch.rule_id) else {
                continue;
            };

            let other = watch.other_watch;

            match is_satisfied(other) {
                Some(true) => {
                    // Rule is satisfied by the other watched literal
                    continue;
                }
                Some(false) => {
                    let result = self.find_new_watch(rule, false_literal, other, &mut is_satisfied);
                    if result != PropagateResult::Ok {
                        results.push(result);
                    }
                }
                None => {
                    let result = self.check_unit(rule, false_literal, other, &mut is_satisfied);
                    if result != PropagateResult::Ok {
                        results.push(result);
                    }
                }
            }
        }

        results
    }

    /// Both watched literals are false; look for a replacement watch
    fn find_new_watch<F>(
        &mut self,
        rule: &Rule,
        false_literal: Literal,
        other_false: Literal,
        is_satisfied: &mut F,
    ) -> PropagateResult
    where
        F: FnMut(Literal) -> Option<bool>,
    {
        for &lit in rule.literals() {
            if lit == false_literal || lit == other_false {
                continue;
            }

            match is_satisfied(lit) {
                Some(true) | None => {
                    self.graph
                        .move_watch(rule.id(), false_literal, lit, other_false);
                    return PropagateResult::Ok;
                }
                Some(false) => continue,
            }
        }

        // Every literal is false
        PropagateResult::Conflict(rule.id())
    }

    /// One watched literal false, the other undecided; the rule is a
    /// unit unless some unwatched literal can take over the watch.
    fn check_unit<F>(
        &mut self,
        rule: &Rule,
        false_literal: Literal,
        undecided: Literal,
        is_satisfied: &mut F,
    ) -> PropagateResult
    where
        F: FnMut(Literal) -> Option<bool>,
    {
        for &lit in rule.literals() {
            if lit == false_literal || lit == undecided {
                continue;
            }

            match is_satisfied(lit) {
                Some(true) | None => {
                    self.graph
                        .move_watch(rule.id(), false_literal, lit, undecided);
                    return PropagateResult::Ok;
                }
                Some(false) => continue,
            }
        }

        // All other literals are false - the undecided one is forced
        PropagateResult::Unit(undecided, rule.id())
    }
}
