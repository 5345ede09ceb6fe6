//! # Reentrancy Lock
//!
//! Binary mutual-exclusion flag guarding the ledger's mutating operations.
//! The hazard: `sell` hands control to an external payment gateway *before*
//! the ledger's own balance and supply fields are updated. A gateway that
//! synchronously calls back into the ledger would otherwise observe a
//! half-applied operation (payout computed, balance not yet debited).
//!
//! Acquisition is scoped: [`ReentrancyLock::enter`] returns a [`LockGuard`]
//! whose `Drop` impl releases the flag, so the lock is released on every
//! exit path — normal return, early `?` abort, or panic unwind.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::LedgerError;

/// The reentrancy flag. One per ledger; `Unlocked` except during the
/// dynamic extent of a single in-progress mutating operation.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    locked: AtomicBool,
}

impl ReentrancyLock {
    /// Creates a lock in the unlocked state.
    pub fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Acquires the lock.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ReentrancyDetected`] if a mutating operation
    /// is already open on this ledger.
    pub fn enter(&self) -> Result<LockGuard<'_>, LedgerError> {
        if self.locked.swap(true, Ordering::Acquire) {
            return Err(LedgerError::ReentrancyDetected);
        }
        Ok(LockGuard { lock: self })
    }

    /// Whether a mutating operation currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

/// Scoped proof of lock ownership. Releases the lock when dropped.
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}
