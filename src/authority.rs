//! The single owner of the active access table and the pending verifications.
//!
//! Both live behind one mutex so that a table swap and the interruption of
//! outstanding tickets happen as one step. The lock is only taken for map
//! manipulation and is never held across an await point or an oracle send.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::access::resolver::resolve;
use crate::access::types::{normalize, Decision};
use crate::access::AccessTable;
use crate::pending::{Interruption, PendingVerifications, Registration};

#[derive(Debug)]
struct AuthorityState {
    table: Arc<AccessTable>,
    generation: u64,
    pending: PendingVerifications,
}

/// Result of evaluating one request against the current table.
#[derive(Debug)]
pub enum Evaluation {
    /// Allow or Deny, known without asking the oracle.
    Decided(Decision),
    /// The request waits on a ticket.
    Verify(Registration),
}

/// Session-scoped authorization state shared by the gate and the reload controller.
#[derive(Debug)]
pub struct Authority {
    state: Mutex<AuthorityState>,
}

impl Authority {
    pub fn new(table: AccessTable) -> Self {
        Self {
            state: Mutex::new(AuthorityState {
                table: Arc::new(table),
                generation: 0,
                pending: PendingVerifications::new(),
            }),
        }
    }

    // The state is plain maps, so a panic elsewhere cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, AuthorityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the active table.
    pub fn table(&self) -> Arc<AccessTable> {
        Arc::clone(&self.lock().table)
    }

    /// Number of successful reloads so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Resolve against the active table without touching the tickets.
    pub fn resolve(&self, user: &str, command: &str) -> Decision {
        let table = self.table();
        resolve(&table, user, command)
    }

    /// Resolve, and on `NeedsVerification` open or join the user's ticket,
    /// both under the same lock.
    pub fn evaluate(&self, user: &str, command: &str) -> Evaluation {
        let user = normalize(user);
        let mut state = self.lock();
        match resolve(&state.table, &user, command) {
            Decision::NeedsVerification => {
                let generation = state.generation;
                Evaluation::Verify(state.pending.query(&user, generation))
            }
            decided => Evaluation::Decided(decided),
        }
    }

    pub fn complete(&self, user: &str, verified: bool) -> usize {
        self.lock().pending.resolve_result(&normalize(user), verified)
    }

    pub fn expire(&self, user: &str, sequence: u64) -> usize {
        self.lock().pending.expire(&normalize(user), sequence)
    }

    pub fn abandon(&self, user: &str, sequence: u64, reason: Interruption) -> usize {
        self.lock()
            .pending
            .abandon(&normalize(user), sequence, reason)
    }

    pub fn interrupt_all(&self, reason: Interruption) -> usize {
        self.lock().pending.interrupt_all(reason)
    }

    /// Install a new table and interrupt every outstanding ticket.
    /// Returns the new generation and the number of waiters interrupted.
    pub fn replace_table(&self, table: AccessTable) -> (u64, usize) {
        let mut state = self.lock();
        state.table = Arc::new(table);
        state.generation += 1;
        let interrupted = state.pending.interrupt_all(Interruption::TableReloaded);
        (state.generation, interrupted)
    }

    pub fn is_pending(&self, user: &str) -> bool {
        self.lock().pending.is_pending(&normalize(user))
    }

    pub fn waiter_count(&self, user: &str) -> usize {
        self.lock().pending.waiter_count(&normalize(user))
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }
}
