use std::sync::Arc;

use crate::access::errors::LoadError;
use crate::access::loader::AccessSource;
use crate::authority::Authority;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    pub generation: u64,
    pub users: usize,
    pub rules: usize,
    /// Waiters that were told their verification was interrupted.
    pub interrupted: usize,
}

impl std::fmt::Display for ReloadSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} users, {} rules, {} pending checks interrupted",
            self.users, self.rules, self.interrupted
        )
    }
}

/// Rebuilds the access table on demand.
pub struct ReloadController {
    authority: Arc<Authority>,
    source: AccessSource,
}

impl ReloadController {
    pub fn new(authority: Arc<Authority>, source: AccessSource) -> Self {
        Self { authority, source }
    }

    pub fn source(&self) -> &AccessSource {
        &self.source
    }

    /// Reload from the configured source.
    pub fn reload(&self) -> Result<ReloadSummary, LoadError> {
        self.reload_from(&self.source)
    }

    /// Build a table from `source` and, only if that succeeds, swap it in and
    /// interrupt every pending verification. A failed load changes nothing.
    pub fn reload_from(&self, source: &AccessSource) -> Result<ReloadSummary, LoadError> {
        let table = source.load().inspect_err(|e| {
            tracing::error!(source = %source, error = %e, "Reload failed, keeping the active access table");
        })?;

        let users = table.user_count();
        let rules = table.rule_count();
        let (generation, interrupted) = self.authority.replace_table(table);

        tracing::info!(
            source = %source,
            generation,
            users,
            rules,
            interrupted,
            "Reloaded access table"
        );

        Ok(ReloadSummary {
            generation,
            users,
            rules,
            interrupted,
        })
    }
}
