//! Ownership and address-validity admission checks.
//!
//! Pure predicates: no side effects, evaluated before any mutation. The
//! null identifier is the empty string — an address the host never assigns
//! to a real caller.

use crate::error::LedgerError;

/// The reserved null address. Transfers to or from it are rejected.
pub const NULL_ADDRESS: &str = "";

/// Holds the owner identity fixed at construction. Ownership transfer is
/// deliberately unsupported.
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: String,
}

impl AccessControl {
    /// Creates an access controller for the given owner address.
    pub fn new(owner: String) -> Self {
        Self { owner }
    }

    /// The owner address.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Fails with [`LedgerError::Unauthorized`] unless `caller` is the owner.
    pub fn require_owner(&self, caller: &str) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }
}

/// Fails with [`LedgerError::InvalidAddress`] if `address` is the null
/// identifier.
pub fn require_nonzero(address: &str) -> Result<(), LedgerError> {
    if address == NULL_ADDRESS {
        return Err(LedgerError::InvalidAddress);
    }
    Ok(())
}
