//! Error types for ledger operations.
//!
//! Every error is local to a single invocation: a failed operation leaves
//! balances and supply exactly as they were (the one deliberate exception
//! is the cooldown timestamp, which is consumed at admission time — see
//! [`crate::cooldown`]).

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can abort a ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The caller is not the ledger owner.
    #[error("unauthorized: {caller} is not the ledger owner")]
    Unauthorized {
        /// The address that attempted the privileged operation.
        caller: String,
    },

    /// An address argument was the null (empty) identifier.
    #[error("invalid address: the null identifier cannot hold or receive units")]
    InvalidAddress,

    /// Minting the requested amount would push supply past the cap.
    #[error("supply cap exceeded: requested {requested}, only {available} issuable")]
    SupplyCapExceeded {
        /// The amount the mint attempted to issue.
        requested: u64,
        /// Units still issuable under the cap.
        available: u64,
    },

    /// The account does not hold enough units.
    #[error("insufficient balance: account has {balance}, operation needs {amount}")]
    InsufficientBalance {
        /// Current balance of the account.
        balance: u64,
        /// Amount the operation required.
        amount: u64,
    },

    /// The account's cooldown window has not elapsed.
    #[error("rate limited: account not eligible again until {until}")]
    RateLimited {
        /// Instant after which the account becomes eligible again.
        until: DateTime<Utc>,
    },

    /// A nested call reached the ledger while another operation was open.
    #[error("reentrancy detected: a mutating operation is already in progress")]
    ReentrancyDetected,

    /// The payment gateway declined the settlement transfer.
    #[error("payment failed: gateway declined sending {amount} to {recipient}")]
    PaymentFailed {
        /// The payout amount the gateway refused to settle.
        amount: u64,
        /// Intended recipient of the payout.
        recipient: String,
    },

    /// The ledger has been closed; no further operations are valid.
    #[error("ledger closed: this ledger has been irreversibly terminated")]
    LedgerClosed,

    /// Arithmetic overflow on a monetary computation.
    #[error("amount overflow: operation would exceed representable limits")]
    AmountOverflow,
}
