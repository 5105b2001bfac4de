//! Per-request authorization.
//!
//! A request starts in `Evaluating`. Allow and Deny decisions go straight
//! to `Decided`. `NeedsVerification` moves the request to `Verifying` until
//! its ticket is settled by the oracle, a timeout or a reload.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::access::types::{normalize, Decision};
use crate::authority::{Authority, Evaluation};
use crate::oracle::Oracle;
use crate::pending::Interruption;

pub const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Terminal state of one authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied,
    /// Neither allowed nor denied; the user should try again.
    Undetermined(Interruption),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allowed => f.write_str("allowed"),
            Verdict::Denied => f.write_str("denied"),
            Verdict::Undetermined(reason) => write!(f, "undetermined ({reason})"),
        }
    }
}

pub struct AuthorizationGate {
    authority: Arc<Authority>,
    oracle: Arc<dyn Oracle>,
    timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(authority: Arc<Authority>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            authority,
            oracle,
            timeout: DEFAULT_VERIFICATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn authority(&self) -> &Arc<Authority> {
        &self.authority
    }

    /// Decide whether `user` may run `command`, asking the oracle if the
    /// table requires it. Concurrent requests for one user share a query.
    pub async fn check_access(&self, user: &str, command: &str) -> Verdict {
        let user = normalize(user);
        let command = normalize(command);
        debug!(%user, %command, state = "evaluating", "Authorization request");

        let registration = match self.authority.evaluate(&user, &command) {
            Evaluation::Decided(decision) => {
                let verdict = match decision {
                    Decision::Allow => Verdict::Allowed,
                    _ => Verdict::Denied,
                };
                debug!(%user, %command, state = "decided", %verdict, "Authorization request");
                return verdict;
            }
            Evaluation::Verify(registration) => registration,
        };

        debug!(
            %user,
            %command,
            state = "verifying",
            sequence = registration.sequence,
            opened = registration.issue_query,
            "Authorization request"
        );

        if registration.issue_query {
            match self.oracle.send_status_query(&user) {
                Ok(()) => self.arm_timeout(user.clone(), registration.sequence),
                Err(e) => {
                    warn!(%user, error = %e, "Failed to send status query");
                    self.authority.abandon(
                        &user,
                        registration.sequence,
                        Interruption::OracleUnavailable,
                    );
                }
            }
        }

        let verdict = match registration.receiver.await {
            Ok(Ok(true)) => Verdict::Allowed,
            Ok(Ok(false)) => Verdict::Denied,
            Ok(Err(reason)) => Verdict::Undetermined(reason),
            Err(_) => Verdict::Undetermined(Interruption::Shutdown),
        };
        debug!(%user, %command, state = "decided", %verdict, "Authorization request");
        verdict
    }

    /// Inbound half of the oracle boundary. Replies nobody waits for are dropped.
    pub fn on_status_reply(&self, user: &str, authenticated: bool) -> usize {
        let notified = self.authority.complete(user, authenticated);
        if notified == 0 {
            debug!(user, authenticated, "Discarding status reply without a pending ticket");
        }
        notified
    }

    fn arm_timeout(&self, user: String, sequence: u64) {
        let authority = Arc::clone(&self.authority);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let expired = authority.expire(&user, sequence);
            if expired > 0 {
                warn!(%user, waiters = expired, ?timeout, "Identity check timed out");
            }
        });
    }
}
