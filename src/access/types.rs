use std::collections::HashMap;
use std::fmt;

/// Reserved key meaning "any user" or "any command".
pub const WILDCARD: &str = "*";

/// Canonical form of a user or command key. Both are case insensitive.
pub fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// Rules declared for a single user: command -> requires_verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: HashMap<String, bool>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a rule under an already normalized command key.
    /// Returns the previous flag if the key was taken.
    pub(crate) fn insert(&mut self, command: String, requires_verification: bool) -> Option<bool> {
        self.rules.insert(command, requires_verification)
    }

    /// Exact lookup of a normalized command key.
    pub fn get(&self, command: &str) -> Option<bool> {
        self.rules.get(command).copied()
    }

    /// Exact command first, then the `*` entry of this rule set.
    pub fn matching(&self, command: &str) -> Option<(bool, bool)> {
        if let Some(flag) = self.get(command) {
            return Some((flag, false));
        }
        self.get(WILDCARD).map(|flag| (flag, true))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Which rule set a matched rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// The requesting user's own rules.
    User,
    /// The `*` user's rules.
    Global,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::User => f.write_str("user"),
            Tier::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedRule {
    pub tier: Tier,
    /// True when the rule matched through the `*` command key.
    pub wildcard_command: bool,
    pub requires_verification: bool,
}

/// Result of the fixed-precedence table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Matched(MatchedRule),
    /// No rule in any tier: implicit deny.
    NoRule,
}

/// Output of the permission resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    NeedsVerification,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Deny => f.write_str("deny"),
            Decision::NeedsVerification => f.write_str("needs-verification"),
        }
    }
}

// ---------- Parser output types ----------

/// A single `<command> #bool` node, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub command: String,
    pub requires_verification: bool,
}

/// A top-level user node, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedUser {
    pub name: String,
    pub rules: Vec<ParsedRule>,
}

/// Intermediate result from parsing one access document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAccess {
    pub users: Vec<ParsedUser>,
}
