//! Correlation of in-flight identity verifications.
//!
//! At most one ticket exists per user. A second request for a user whose
//! status query is still outstanding joins the existing ticket as another
//! waiter instead of sending a second query.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::oneshot;

/// Why a verification ended without an answer from the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// The access table was replaced while the query was outstanding.
    TableReloaded,
    /// The oracle did not answer in time.
    Timeout,
    /// The status query could not be sent.
    OracleUnavailable,
    /// The ticket was dropped without being settled.
    Shutdown,
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interruption::TableReloaded => f.write_str("access table reloaded"),
            Interruption::Timeout => f.write_str("identity check timed out"),
            Interruption::OracleUnavailable => f.write_str("identity service unavailable"),
            Interruption::Shutdown => f.write_str("bot shutting down"),
        }
    }
}

/// `Ok(authenticated)` from the oracle, or the reason there is no answer.
pub type VerificationOutcome = Result<bool, Interruption>;

#[derive(Debug)]
struct Ticket {
    sequence: u64,
    generation: u64,
    waiters: Vec<oneshot::Sender<VerificationOutcome>>,
}

impl Ticket {
    /// Notify every waiter in registration order. Returns how many were registered.
    fn settle(self, outcome: VerificationOutcome) -> usize {
        let count = self.waiters.len();
        for waiter in self.waiters {
            // A waiter whose request was cancelled has dropped its receiver.
            let _ = waiter.send(outcome);
        }
        count
    }
}

/// A caller's handle on a ticket.
#[derive(Debug)]
pub struct Registration {
    pub receiver: oneshot::Receiver<VerificationOutcome>,
    /// Identifies the ticket, so a timer only expires the one it was armed for.
    pub sequence: u64,
    /// True for the caller that opened the ticket; it must send the one status query.
    pub issue_query: bool,
}

#[derive(Debug, Default)]
pub struct PendingVerifications {
    in_flight: HashMap<String, Ticket>,
    next_sequence: u64,
}

impl PendingVerifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the ticket for `user`, or open one under the given table generation.
    pub fn query(&mut self, user: &str, generation: u64) -> Registration {
        let (tx, rx) = oneshot::channel();

        if let Some(ticket) = self.in_flight.get_mut(user) {
            ticket.waiters.push(tx);
            return Registration {
                receiver: rx,
                sequence: ticket.sequence,
                issue_query: false,
            };
        }

        self.next_sequence += 1;
        let sequence = self.next_sequence;
        self.in_flight.insert(
            user.to_string(),
            Ticket {
                sequence,
                generation,
                waiters: vec![tx],
            },
        );
        Registration {
            receiver: rx,
            sequence,
            issue_query: true,
        }
    }

    /// Settle the ticket for `user` with the oracle's answer.
    /// Returns the number of waiters notified; 0 means the reply was late.
    pub fn resolve_result(&mut self, user: &str, verified: bool) -> usize {
        match self.in_flight.remove(user) {
            Some(ticket) => {
                tracing::debug!(
                    user,
                    sequence = ticket.sequence,
                    generation = ticket.generation,
                    verified,
                    "Settling verification ticket"
                );
                ticket.settle(Ok(verified))
            }
            None => 0,
        }
    }

    /// Drop every ticket, telling each waiter why.
    pub fn interrupt_all(&mut self, reason: Interruption) -> usize {
        self.in_flight
            .drain()
            .map(|(_, ticket)| ticket.settle(Err(reason)))
            .sum()
    }

    /// Time out the ticket opened as `sequence`, if it is still pending.
    pub fn expire(&mut self, user: &str, sequence: u64) -> usize {
        self.abandon(user, sequence, Interruption::Timeout)
    }

    /// Settle the ticket opened as `sequence` with an interruption.
    /// A newer ticket for the same user is left alone.
    pub fn abandon(&mut self, user: &str, sequence: u64, reason: Interruption) -> usize {
        match self.in_flight.get(user) {
            Some(ticket) if ticket.sequence == sequence => {}
            _ => return 0,
        }
        self.in_flight
            .remove(user)
            .map_or(0, |ticket| ticket.settle(Err(reason)))
    }

    pub fn is_pending(&self, user: &str) -> bool {
        self.in_flight.contains_key(user)
    }

    pub fn waiter_count(&self, user: &str) -> usize {
        self.in_flight.get(user).map_or(0, |t| t.waiters.len())
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_query_joins_ticket() {
        let mut pending = PendingVerifications::new();
        let first = pending.query("alice", 0);
        let second = pending.query("alice", 0);

        assert!(first.issue_query);
        assert!(!second.issue_query);
        assert_eq!(first.sequence, second.sequence);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.waiter_count("alice"), 2);
    }

    #[test]
    fn test_resolve_notifies_all_waiters() {
        let mut pending = PendingVerifications::new();
        let mut first = pending.query("alice", 0);
        let mut second = pending.query("alice", 0);

        assert_eq!(pending.resolve_result("alice", true), 2);
        assert_eq!(first.receiver.try_recv().unwrap(), Ok(true));
        assert_eq!(second.receiver.try_recv().unwrap(), Ok(true));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_late_reply_is_discarded() {
        let mut pending = PendingVerifications::new();
        assert_eq!(pending.resolve_result("nobody", true), 0);

        let _reg = pending.query("alice", 0);
        pending.resolve_result("alice", false);
        assert_eq!(pending.resolve_result("alice", true), 0);
    }

    #[test]
    fn test_interrupt_all_notifies_every_user() {
        let mut pending = PendingVerifications::new();
        let mut alice = pending.query("alice", 0);
        let mut bob = pending.query("bob", 0);

        assert_eq!(pending.interrupt_all(Interruption::TableReloaded), 2);
        assert_eq!(
            alice.receiver.try_recv().unwrap(),
            Err(Interruption::TableReloaded)
        );
        assert_eq!(
            bob.receiver.try_recv().unwrap(),
            Err(Interruption::TableReloaded)
        );

        assert_eq!(pending.resolve_result("alice", true), 0);
        assert_eq!(pending.resolve_result("bob", true), 0);
    }

    #[test]
    fn test_new_ticket_after_resolution() {
        let mut pending = PendingVerifications::new();
        let first = pending.query("alice", 0);
        pending.resolve_result("alice", true);

        let second = pending.query("alice", 0);
        assert!(second.issue_query);
        assert_ne!(first.sequence, second.sequence);
    }

    #[test]
    fn test_expire_matches_sequence() {
        let mut pending = PendingVerifications::new();
        let stale = pending.query("alice", 0);
        pending.resolve_result("alice", true);
        let mut fresh = pending.query("alice", 1);

        // The timer armed for the first ticket must not touch the second.
        assert_eq!(pending.expire("alice", stale.sequence), 0);
        assert!(pending.is_pending("alice"));

        assert_eq!(pending.expire("alice", fresh.sequence), 1);
        assert_eq!(fresh.receiver.try_recv().unwrap(), Err(Interruption::Timeout));
        assert!(!pending.is_pending("alice"));
    }

    #[test]
    fn test_abandon_with_reason() {
        let mut pending = PendingVerifications::new();
        let mut reg = pending.query("alice", 0);
        assert_eq!(
            pending.abandon("alice", reg.sequence, Interruption::OracleUnavailable),
            1
        );
        assert_eq!(
            reg.receiver.try_recv().unwrap(),
            Err(Interruption::OracleUnavailable)
        );
    }

    #[test]
    fn test_dropped_receiver_does_not_block_others() {
        let mut pending = PendingVerifications::new();
        let first = pending.query("alice", 0);
        let mut second = pending.query("alice", 0);
        drop(first);

        assert_eq!(pending.resolve_result("alice", true), 2);
        assert_eq!(second.receiver.try_recv().unwrap(), Ok(true));
    }
}
