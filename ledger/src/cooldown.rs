//! # Cooldown Gate
//!
//! Per-account rate limiting for `transfer` and `sell`. An account that
//! passes the gate has its next-eligible timestamp advanced immediately —
//! the side effect is part of the check itself, not deferred to the
//! operation body. Eligibility is consumed at admission time, so a later
//! abort (e.g. a declined gateway settlement) does not refund it.

use chrono::{DateTime, Duration, Utc};

use crate::error::LedgerError;
use crate::ledger::Account;

/// Enforces the minimum interval between rate-limited operations by the
/// same account. The window is fixed at construction.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    duration: Duration,
}

impl CooldownGate {
    /// Creates a gate with the given window, in seconds.
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            duration: Duration::seconds(cooldown_secs as i64),
        }
    }

    /// The configured window.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Admits the account if its window has elapsed, advancing the
    /// next-eligible timestamp as a side effect of admission.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::RateLimited`] if `now` is not strictly past
    /// the account's next-eligible instant. The timestamp is untouched on
    /// failure, so `next_eligible` is non-decreasing either way.
    pub fn check_and_advance(
        &self,
        account: &mut Account,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        if now <= account.next_eligible {
            return Err(LedgerError::RateLimited {
                until: account.next_eligible,
            });
        }
        account.next_eligible = now + self.duration;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn fresh_account_passes_and_advances() {
        let gate = CooldownGate::new(60);
        let mut account = Account::new();
        gate.check_and_advance(&mut account, at(1_000)).unwrap();
        assert_eq!(account.next_eligible, at(1_060));
    }

    #[test]
    fn within_window_rejected() {
        let gate = CooldownGate::new(60);
        let mut account = Account::new();
        gate.check_and_advance(&mut account, at(1_000)).unwrap();

        let result = gate.check_and_advance(&mut account, at(1_030));
        assert!(matches!(result, Err(LedgerError::RateLimited { until }) if until == at(1_060)));
        // A rejected check must not move the timestamp.
        assert_eq!(account.next_eligible, at(1_060));
    }

    #[test]
    fn boundary_instant_still_rejected() {
        // Eligibility requires now strictly past the timestamp.
        let gate = CooldownGate::new(60);
        let mut account = Account::new();
        gate.check_and_advance(&mut account, at(1_000)).unwrap();
        assert!(gate.check_and_advance(&mut account, at(1_060)).is_err());
        assert!(gate.check_and_advance(&mut account, at(1_061)).is_ok());
    }

    #[test]
    fn zero_window_allows_consecutive_distinct_instants() {
        let gate = CooldownGate::new(0);
        let mut account = Account::new();
        gate.check_and_advance(&mut account, at(10)).unwrap();
        assert!(gate.check_and_advance(&mut account, at(10)).is_err());
        gate.check_and_advance(&mut account, at(11)).unwrap();
    }
}
