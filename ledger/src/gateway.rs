//! # External Collaborator Boundaries
//!
//! The ledger settles value and announces mutations through two injected
//! capabilities rather than concrete services:
//!
//! - [`PaymentGateway`] performs the actual value transfer when a holder
//!   liquidates units. Its mechanics are opaque — the ledger consumes it
//!   only through `send(amount, recipient) -> bool`, invoked synchronously
//!   from inside `sell`'s critical section.
//! - [`EventSink`] receives a [`LedgerEvent`] synchronously after each
//!   successful mutation.
//!
//! Both are object-safe traits so tests can substitute deterministic
//! doubles: always-succeed, always-fail, or a gateway that re-enters the
//! ledger mid-settlement.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Settles a payout to a recipient. Returns `true` on success; `false`
/// aborts the enclosing `sell` with no balance or supply change.
pub trait PaymentGateway: Send + Sync {
    /// Sends `amount` of settlement value to `recipient`.
    fn send(&self, amount: u64, recipient: &str) -> bool;
}

/// A notification describing one completed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// Units moved between two holders.
    Transfer {
        /// Debited account.
        from: String,
        /// Credited account.
        to: String,
        /// Units moved.
        amount: u64,
    },
    /// New units issued by the owner.
    Mint {
        /// Credited account.
        to: String,
        /// Units issued.
        amount: u64,
    },
    /// Units liquidated through the payment gateway.
    Sell {
        /// The liquidating holder.
        from: String,
        /// Units retired.
        amount: u64,
    },
}

/// Receives notifications of completed mutations.
pub trait EventSink: Send + Sync {
    /// Called synchronously after a successful mutation, before the
    /// operation returns.
    fn emit(&self, event: &LedgerEvent);
}

/// Forwards events to the `tracing` subscriber at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::Transfer { from, to, amount } => {
                info!(%from, %to, amount, "transfer completed");
            }
            LedgerEvent::Mint { to, amount } => {
                info!(%to, amount, "mint completed");
            }
            LedgerEvent::Sell { from, amount } => {
                info!(%from, amount, "sell completed");
            }
        }
    }
}

/// Discards all events. Useful when no observer is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &LedgerEvent) {}
}
