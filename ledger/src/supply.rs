//! Issuance cap enforcement.

use crate::error::LedgerError;

/// Enforces the immutable upper bound on total issuable units. Pure
/// predicate; evaluated before every mint mutation.
#[derive(Debug, Clone, Copy)]
pub struct SupplyController {
    max_supply: u64,
}

impl SupplyController {
    /// Creates a controller with the given cap.
    pub fn new(max_supply: u64) -> Self {
        Self { max_supply }
    }

    /// The issuance cap.
    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    /// Fails with [`LedgerError::SupplyCapExceeded`] unless
    /// `current + amount` fits under the cap. Overflow of the sum itself
    /// necessarily exceeds the cap and is reported the same way.
    pub fn check_cap(&self, current: u64, amount: u64) -> Result<(), LedgerError> {
        let exceeded = match current.checked_add(amount) {
            Some(next) => next > self.max_supply,
            None => true,
        };
        if exceeded {
            return Err(LedgerError::SupplyCapExceeded {
                requested: amount,
                available: self.max_supply.saturating_sub(current),
            });
        }
        Ok(())
    }
}
