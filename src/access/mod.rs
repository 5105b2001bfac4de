pub mod errors;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod types;

use std::collections::HashMap;

use errors::LoadError;
use types::{normalize, MatchedRule, RuleOutcome, RuleSet, Tier, WILDCARD};

/// One loaded permission set, keyed by normalized user name.
/// Immutable after construction; a reload builds a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessTable {
    entries: HashMap<String, RuleSet>,
}

impl AccessTable {
    /// A table without any rules. Every command is denied.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: HashMap<String, RuleSet>) -> Self {
        Self { entries }
    }

    /// Parse and compile KDL access text held in memory.
    pub fn from_kdl_str(source: &str) -> Result<Self, LoadError> {
        loader::compile_access(parser::parse_access_document(source)?)
    }

    pub fn rules_for(&self, user: &str) -> Option<&RuleSet> {
        self.entries.get(&normalize(user))
    }

    /// Rules of the `*` user.
    pub fn global_rules(&self) -> Option<&RuleSet> {
        self.entries.get(WILDCARD)
    }

    pub fn user_count(&self) -> usize {
        self.entries.len()
    }

    pub fn rule_count(&self) -> usize {
        self.entries.values().map(RuleSet::len).sum()
    }

    /// User tier over already normalized keys: `(user, command)` then `(user, *)`.
    pub(crate) fn user_tier(&self, user: &str, command: &str) -> Option<MatchedRule> {
        if user == WILDCARD {
            return None;
        }
        let (flag, wildcard_command) = self.entries.get(user)?.matching(command)?;
        Some(MatchedRule {
            tier: Tier::User,
            wildcard_command,
            requires_verification: flag,
        })
    }

    /// Global tier over an already normalized command: `(*, command)` then `(*, *)`.
    pub(crate) fn global_tier(&self, command: &str) -> Option<MatchedRule> {
        let (flag, wildcard_command) = self.global_rules()?.matching(command)?;
        Some(MatchedRule {
            tier: Tier::Global,
            wildcard_command,
            requires_verification: flag,
        })
    }

    /// First matching rule in precedence order:
    /// `(user, command)`, `(user, *)`, `(*, command)`, `(*, *)`.
    pub fn lookup_rule(&self, user: &str, command: &str) -> RuleOutcome {
        let user = normalize(user);
        let command = normalize(command);
        self.user_tier(&user, &command)
            .or_else(|| self.global_tier(&command))
            .map_or(RuleOutcome::NoRule, RuleOutcome::Matched)
    }
}
