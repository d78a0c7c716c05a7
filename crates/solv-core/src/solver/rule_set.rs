use std::collections::HashMap;

use super::rule::{Rule, RuleType};

/// Collection of SAT rules organized by type.
///
/// The RuleSet manages rules with:
/// - Deduplication based on literal content
/// - Sequential ID assignment
/// - A per-type index for iteration
#[derive(Debug)]
pub struct RuleSet {
    /// All rules indexed by ID
    rules: Vec<Rule>,

    /// Rules by type for iteration
    rules_by_type: HashMap<RuleType, Vec<u32>>,

    /// Hash map for deduplication
    rule_hashes: HashMap<u64, u32>,

    /// Next rule ID to assign
    next_id: u32,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            rules_by_type: HashMap::new(),
            rule_hashes: HashMap::new(),
            next_id: 0,
        }
    }

    /// Add a rule to the set, returning its ID.
    /// Returns the existing rule's ID if a duplicate exists.
    pub fn add(&mut self, mut rule: Rule) -> u32 {
        let hash = rule.literal_hash();
        if let Some(&existing_id) = self.rule_hashes.get(&hash) {
            // Hash collision check
            if let Some(existing) = self.get(existing_id) {
                if existing.equals_literals(&rule) {
                    return existing_id;
                }
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        rule.set_id(id);

        self.rules_by_type
            .entry(rule.rule_type())
            .or_default()
            .push(id);
        self.rule_hashes.insert(hash, id);
        self.rules.push(rule);

        id
    }

    pub fn get(&self, id: u32) -> Option<&Rule> {
        self.rules.get(id as usize)
    }

    /// All rules of a specific type
    pub fn rules_of_type(&self, rule_type: RuleType) -> impl Iterator<Item = &Rule> {
        self.rules_by_type
            .get(&rule_type)
            .into_iter()
            .flatten()
            .filter_map(move |&id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    /// Single-literal rules that must be asserted before search
    pub fn assertions(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_assertion())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn count_by_type(&self, rule_type: RuleType) -> usize {
        self.rules_by_type
            .get(&rule_type)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    /// Statistics used by the generator's log output
    pub fn stats(&self) -> RuleSetStats {
        let mut stats = RuleSetStats {
            total: self.rules.len(),
            ..RuleSetStats::default()
        };

        for rule in &self.rules {
            match rule.rule_type() {
                RuleType::JobInstall => stats.job_install += 1,
                RuleType::JobRemove => stats.job_remove += 1,
                RuleType::JobUpdate => stats.job_update += 1,
                RuleType::Requires => stats.requires += 1,
                RuleType::Conflict => stats.conflict += 1,
                RuleType::SameName => stats.same_name += 1,
                RuleType::Learned => stats.learned += 1,
            }

            if rule.is_assertion() {
                stats.assertions += 1;
            }
        }

        stats
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a rule set
#[derive(Debug, Default)]
pub struct RuleSetStats {
    pub total: usize,
    pub assertions: usize,
    pub job_install: usize,
    pub job_remove: usize,
    pub job_update: usize,
    pub requires: usize,
    pub conflict: usize,
    pub same_name: usize,
    pub learned: usize,
}
