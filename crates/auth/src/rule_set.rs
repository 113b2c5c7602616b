use std::collections::{HashMap, HashSet};

use crate::{Action, CodeError, Rule, RuleMapping, Subject};

/// Immutable set of allowed `(action, subject)` pairs.
///
/// Built in one go from a principal's permission codes and never patched
/// afterwards; a change of principal means a new `RuleSet`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    by_action: HashMap<Action, HashSet<Subject>>,
    len: usize,
}

/// What happened during a [`RuleSet::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Permission codes looked at.
    pub codes: usize,
    /// Distinct rules in the resulting set.
    pub rules: usize,
    /// Codes the mapping refused; they granted nothing.
    pub rejected: Vec<CodeError>,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map every code through `mapping` and collect the resulting rules.
    ///
    /// Rejected codes are logged and reported, never fatal.
    pub fn build<'a, I>(codes: I, mapping: &dyn RuleMapping) -> (Self, RebuildReport)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = Self::empty();
        let mut report = RebuildReport::default();

        for code in codes {
            report.codes += 1;
            match mapping.rules_for(code) {
                Ok(rules) => rules.into_iter().for_each(|r| set.insert(r)),
                Err(err) => {
                    tracing::warn!(mapping = mapping.name(), %err, "permission code rejected");
                    report.rejected.push(err);
                }
            }
        }

        report.rules = set.len;
        (set, report)
    }

    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut set = Self::empty();
        rules.into_iter().for_each(|r| set.insert(r));
        set
    }

    fn insert(&mut self, rule: Rule) {
        if self.by_action.entry(rule.action).or_default().insert(rule.subject) {
            self.len += 1;
        }
    }

    /// Exact pair membership.
    pub fn contains(&self, action: &str, subject: &str) -> bool {
        self.by_action
            .get(action)
            .is_some_and(|subjects| subjects.contains(subject))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Subjects the given action is allowed on, sorted.
    pub fn subjects_for(&self, action: &str) -> Vec<&Subject> {
        let mut subjects: Vec<&Subject> = self
            .by_action
            .get(action)
            .map(|s| s.iter().collect())
            .unwrap_or_default();
        subjects.sort();
        subjects
    }

    /// Actions allowed on the given subject, sorted.
    pub fn actions_for(&self, subject: &str) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self
            .by_action
            .iter()
            .filter(|(_, subjects)| subjects.contains(subject))
            .map(|(action, _)| action)
            .collect();
        actions.sort();
        actions
    }

    /// All rules, sorted (for display and audit).
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self
            .by_action
            .iter()
            .flat_map(|(action, subjects)| {
                subjects.iter().map(move |subject| Rule {
                    action: action.clone(),
                    subject: subject.clone(),
                })
            })
            .collect();
        rules.sort();
        rules
    }
}
