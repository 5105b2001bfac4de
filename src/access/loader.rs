use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::access::errors::LoadError;
use crate::access::parser::parse_access_document;
use crate::access::types::*;
use crate::access::AccessTable;

/// Where an access table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessSource {
    /// A KDL file on disk, re-read on every load.
    File(PathBuf),
    /// KDL text held in memory.
    Inline(String),
}

impl AccessSource {
    pub fn load(&self) -> Result<AccessTable, LoadError> {
        match self {
            AccessSource::File(path) => load_access_file(path),
            AccessSource::Inline(text) => compile_access(parse_access_document(text)?),
        }
    }
}

impl std::fmt::Display for AccessSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessSource::File(path) => write!(f, "{}", path.display()),
            AccessSource::Inline(_) => f.write_str("<inline>"),
        }
    }
}

/// Read and compile a KDL access file into an immutable `AccessTable`.
pub fn load_access_file(path: &Path) -> Result<AccessTable, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let table = compile_access(parse_access_document(&contents)?)?;

    tracing::info!(
        path = %path.display(),
        users = table.user_count(),
        rules = table.rule_count(),
        "Loaded access table"
    );

    Ok(table)
}

/// Normalize all keys and build the table, rejecting duplicates that only
/// differ by case.
pub fn compile_access(parsed: ParsedAccess) -> Result<AccessTable, LoadError> {
    let mut entries: HashMap<String, RuleSet> = HashMap::new();

    for user in parsed.users {
        let user_key = normalize(&user.name);
        if entries.contains_key(&user_key) {
            return Err(LoadError::DuplicateUser(user_key));
        }

        let mut rules = RuleSet::new();
        for rule in user.rules {
            let command_key = normalize(&rule.command);
            if rules.get(&command_key).is_some() {
                return Err(LoadError::DuplicateCommand {
                    user: user_key,
                    command: command_key,
                });
            }
            rules.insert(command_key, rule.requires_verification);
        }

        entries.insert(user_key, rules);
    }

    Ok(AccessTable::from_entries(entries))
}
