use crate::access::errors::LoadError;
use crate::access::types::*;
use kdl::{KdlDocument, KdlNode, KdlValue};

/// Parse a KDL access document into typed, not yet normalized, user rules.
///
/// Only the shape is validated here; duplicate detection happens when the
/// table is compiled, after keys are normalized.
pub fn parse_access_document(source: &str) -> Result<ParsedAccess, LoadError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| LoadError::Syntax(e.to_string()))?;

    let mut access = ParsedAccess::default();

    for node in doc.nodes() {
        let name = node.name().value().to_string();
        if !node.entries().is_empty() {
            return Err(LoadError::UserWithArguments(name));
        }

        let mut rules = Vec::new();
        if let Some(children) = node.children() {
            for child in children.nodes() {
                rules.push(parse_rule(&name, child)?);
            }
        }

        access.users.push(ParsedUser { name, rules });
    }

    Ok(access)
}

/// Parse `<command> #true|#false`. Anything other than a single boolean
/// argument is rejected.
fn parse_rule(user: &str, node: &KdlNode) -> Result<ParsedRule, LoadError> {
    let command = node.name().value().to_string();

    if node.children().is_some() {
        return Err(LoadError::UnexpectedChildren {
            user: user.to_string(),
            command,
        });
    }

    if let Some(prop) = node.entries().iter().find_map(|e| e.name()) {
        return Err(LoadError::UnexpectedProperty {
            user: user.to_string(),
            command,
            property: prop.value().to_string(),
        });
    }

    let [entry] = node.entries() else {
        return Err(LoadError::MissingFlag {
            user: user.to_string(),
            command,
        });
    };

    match entry.value() {
        KdlValue::Bool(flag) => Ok(ParsedRule {
            command,
            requires_verification: *flag,
        }),
        other => Err(LoadError::NotBoolean {
            user: user.to_string(),
            command,
            found: other.to_string(),
        }),
    }
}
