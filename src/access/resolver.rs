use crate::access::types::{normalize, Decision, MatchedRule};
use crate::access::AccessTable;

/// Decide whether `user` may run `command` under `table`.
///
/// The user tier is `(user, command)` then `(user, *)`; the global tier is
/// `(*, command)` then `(*, *)`. A user rule decides when present: `false`
/// denies, `true` requires verification unless the global tier also says
/// `true`, in which case the round-trip is skipped. Without a user rule the
/// global tier decides, and no rule at all denies.
pub fn resolve(table: &AccessTable, user: &str, command: &str) -> Decision {
    let user = normalize(user);
    let command = normalize(command);

    let user_tier = table.user_tier(&user, &command);
    let global_tier = table.global_tier(&command);

    decide(user_tier, global_tier)
}

fn decide(user_tier: Option<MatchedRule>, global_tier: Option<MatchedRule>) -> Decision {
    let global = global_tier.map(|r| r.requires_verification);

    match user_tier.map(|r| r.requires_verification) {
        Some(false) => Decision::Deny,
        Some(true) if global == Some(true) => Decision::Allow,
        Some(true) => Decision::NeedsVerification,
        None => match global {
            Some(true) => Decision::NeedsVerification,
            Some(false) | None => Decision::Deny,
        },
    }
}
