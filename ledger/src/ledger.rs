//! # Single-Asset Ledger
//!
//! The guarded state-transition core. Holds per-account balances and the
//! aggregate supply, and implements `transfer`, `mint`, `sell`, and `close`
//! as a fixed chain of admission checks composed around the mutation
//! itself:
//!
//! 1. Admission checks run in an operation-specific order.
//! 2. On success the reentrancy lock is acquired.
//! 3. The ledger state is mutated under the state mutex.
//! 4. A notification is emitted to the event sink.
//! 5. The lock is released (RAII).
//!
//! Any failing check aborts the whole operation with no balance or supply
//! change. One deliberate asymmetry is preserved from the original design:
//! `transfer` checks balance and cooldown *before* acquiring the lock,
//! while `sell` acquires the lock *before* those checks. The orders are
//! observable (they change which failures occur inside the locked region)
//! and must not be unified without revisiting the callers.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::access::{self, AccessControl};
use crate::clock::{Clock, SystemClock};
use crate::cooldown::CooldownGate;
use crate::error::LedgerError;
use crate::gateway::{EventSink, LedgerEvent, PaymentGateway};
use crate::guard::ReentrancyLock;
use crate::supply::SupplyController;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One holder's slice of the ledger. Created implicitly on first reference
/// with a zero balance and epoch eligibility; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Units currently held.
    pub balance: u64,
    /// Instant after which the account may next pass the cooldown gate.
    /// Non-decreasing over the account's lifetime.
    pub next_eligible: DateTime<Utc>,
}

impl Account {
    /// A fresh account: zero balance, immediately eligible.
    pub fn new() -> Self {
        Self {
            balance: 0,
            next_eligible: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

/// Construction parameters. All fields are immutable once the ledger
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Human-readable asset name (e.g., "Aurum Note").
    pub name: String,
    /// Ticker symbol (e.g., "AUR").
    pub symbol: String,
    /// Upper bound on total issuable units.
    pub max_supply: u64,
    /// Settlement value of one unit, in gateway denomination.
    pub unit_price: u64,
    /// Minimum seconds between rate-limited operations per account.
    pub cooldown_secs: u64,
}

/// Operational lifetime of the ledger. The transition is one-way: once
/// `Closed`, every mutating operation fails deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Accepting operations.
    Active,
    /// Irreversibly terminated by the owner.
    Closed,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::Active => write!(f, "Active"),
            Lifecycle::Closed => write!(f, "Closed"),
        }
    }
}

/// A serializable point-in-time view of the full ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Unique instance id assigned at construction.
    pub id: Uuid,
    /// Asset name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Owner address.
    pub owner: String,
    /// Issuance cap.
    pub max_supply: u64,
    /// Per-unit settlement price.
    pub unit_price: u64,
    /// Units currently in circulation.
    pub total_supply: u64,
    /// Lifecycle state.
    pub lifecycle: Lifecycle,
    /// All accounts ever referenced, keyed by address.
    pub accounts: HashMap<String, Account>,
    /// When the ledger was constructed.
    pub created_at: DateTime<Utc>,
}

/// The mutable portion of the ledger, guarded by one mutex.
#[derive(Debug)]
struct LedgerState {
    total_supply: u64,
    accounts: HashMap<String, Account>,
    lifecycle: Lifecycle,
}

impl LedgerState {
    fn require_active(&self) -> Result<(), LedgerError> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            Lifecycle::Closed => Err(LedgerError::LedgerClosed),
        }
    }

    fn balance(&self, address: &str) -> u64 {
        self.accounts.get(address).map(|a| a.balance).unwrap_or(0)
    }

    fn account_mut(&mut self, address: &str) -> &mut Account {
        self.accounts.entry(address.to_string()).or_default()
    }

    fn credit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError> {
        let account = self.account_mut(address);
        account.balance = account
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(())
    }

    fn debit(&mut self, address: &str, amount: u64) -> Result<(), LedgerError> {
        let account = self.account_mut(address);
        account.balance = account
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// A single-asset accounting ledger with a fixed supply cap, fixed unit
/// price, per-account rate limiting, and owner-gated issuance.
///
/// Constructed once; `owner` and all configuration are fixed for its
/// lifetime. The payment gateway, event sink, and clock are injected
/// capabilities so they can be substituted with deterministic doubles.
pub struct Ledger {
    id: Uuid,
    name: String,
    symbol: String,
    unit_price: u64,
    created_at: DateTime<Utc>,
    access: AccessControl,
    cooldown: CooldownGate,
    supply: SupplyController,
    lock: ReentrancyLock,
    state: Mutex<LedgerState>,
    gateway: Arc<dyn PaymentGateway>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Creates a ledger owned by `owner`, using the wall clock.
    pub fn new(
        owner: impl Into<String>,
        config: LedgerConfig,
        gateway: Arc<dyn PaymentGateway>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self::with_clock(owner, config, gateway, events, Arc::new(SystemClock))
    }

    /// Creates a ledger with an explicit time source.
    pub fn with_clock(
        owner: impl Into<String>,
        config: LedgerConfig,
        gateway: Arc<dyn PaymentGateway>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let owner = owner.into();
        let id = Uuid::new_v4();
        info!(
            ledger = %id,
            name = %config.name,
            symbol = %config.symbol,
            max_supply = config.max_supply,
            unit_price = config.unit_price,
            cooldown_secs = config.cooldown_secs,
            %owner,
            "ledger created"
        );
        Self {
            id,
            name: config.name,
            symbol: config.symbol,
            unit_price: config.unit_price,
            created_at: clock.now(),
            access: AccessControl::new(owner),
            cooldown: CooldownGate::new(config.cooldown_secs),
            supply: SupplyController::new(config.max_supply),
            lock: ReentrancyLock::new(),
            state: Mutex::new(LedgerState {
                total_supply: 0,
                accounts: HashMap::new(),
                lifecycle: Lifecycle::Active,
            }),
            gateway,
            events,
            clock,
        }
    }

    // -----------------------------------------------------------------------
    // Mutating operations
    // -----------------------------------------------------------------------

    /// Moves `amount` units from `caller` to `to`.
    ///
    /// Admission order: nonzero(caller), nonzero(to), active, sufficient
    /// balance, cooldown(caller), lock. The cooldown timestamp advances as
    /// part of its check.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAddress`], [`LedgerError::LedgerClosed`],
    /// [`LedgerError::InsufficientBalance`], [`LedgerError::RateLimited`],
    /// or [`LedgerError::ReentrancyDetected`].
    pub fn transfer(&self, caller: &str, to: &str, amount: u64) -> Result<bool, LedgerError> {
        access::require_nonzero(caller)?;
        access::require_nonzero(to)?;

        let now = self.clock.now();
        let mut state = self.state.lock();
        state.require_active()?;

        let balance = state.balance(caller);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance { balance, amount });
        }
        self.cooldown.check_and_advance(state.account_mut(caller), now)?;

        let _guard = self.lock.enter()?;
        state.debit(caller, amount)?;
        state.credit(to, amount)?;
        debug!(ledger = %self.id, from = caller, to, amount, "transfer applied");

        // Release the state mutex before handing control to the sink; the
        // reentrancy lock stays held until after the emit.
        drop(state);
        self.events.emit(&LedgerEvent::Transfer {
            from: caller.to_string(),
            to: to.to_string(),
            amount,
        });
        Ok(true)
    }

    /// Issues `amount` new units to `to`. Owner only.
    ///
    /// Admission order: owner(caller), nonzero(to), active, supply cap,
    /// lock.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`], [`LedgerError::InvalidAddress`],
    /// [`LedgerError::LedgerClosed`], [`LedgerError::SupplyCapExceeded`],
    /// or [`LedgerError::ReentrancyDetected`].
    pub fn mint(&self, caller: &str, to: &str, amount: u64) -> Result<bool, LedgerError> {
        self.access.require_owner(caller)?;
        access::require_nonzero(to)?;

        let mut state = self.state.lock();
        state.require_active()?;
        self.supply.check_cap(state.total_supply, amount)?;

        let _guard = self.lock.enter()?;
        state.total_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        state.credit(to, amount)?;
        debug!(ledger = %self.id, to, amount, total_supply = state.total_supply, "mint applied");

        drop(state);
        self.events.emit(&LedgerEvent::Mint {
            to: to.to_string(),
            amount,
        });
        Ok(true)
    }

    /// Liquidates `amount` of the caller's units through the payment
    /// gateway at the fixed unit price.
    ///
    /// Admission order: nonzero(caller), **lock**, active, sufficient
    /// balance, cooldown(caller) — the lock is taken *before* the balance
    /// and cooldown checks, unlike `transfer`. The gateway is invoked
    /// inside the locked region but outside the state mutex; a gateway
    /// that synchronously re-enters the ledger gets
    /// [`LedgerError::ReentrancyDetected`] on the inner call while this
    /// call completes normally.
    ///
    /// A declined settlement aborts with [`LedgerError::PaymentFailed`]
    /// and no balance or supply change; the cooldown eligibility consumed
    /// at admission is not refunded.
    pub fn sell(&self, caller: &str, amount: u64) -> Result<bool, LedgerError> {
        access::require_nonzero(caller)?;

        let _guard = self.lock.enter()?;
        let now = self.clock.now();
        let payout = {
            let mut state = self.state.lock();
            state.require_active()?;

            let balance = state.balance(caller);
            if balance < amount {
                return Err(LedgerError::InsufficientBalance { balance, amount });
            }
            self.cooldown.check_and_advance(state.account_mut(caller), now)?;

            amount
                .checked_mul(self.unit_price)
                .ok_or(LedgerError::AmountOverflow)?
            // State mutex released here; the gateway must not be able to
            // deadlock against it.
        };

        debug!(ledger = %self.id, from = caller, amount, payout, "settling sell");
        if !self.gateway.send(payout, caller) {
            warn!(ledger = %self.id, from = caller, payout, "gateway declined sell settlement");
            return Err(LedgerError::PaymentFailed {
                amount: payout,
                recipient: caller.to_string(),
            });
        }

        {
            let mut state = self.state.lock();
            state.total_supply = state
                .total_supply
                .checked_sub(amount)
                .ok_or(LedgerError::AmountOverflow)?;
            state.debit(caller, amount)?;
        }
        self.events.emit(&LedgerEvent::Sell {
            from: caller.to_string(),
            amount,
        });
        Ok(true)
    }

    /// Irreversibly ends the ledger's operational lifetime. Owner only.
    ///
    /// Admission order: owner(caller), lock, active. Like every mutating
    /// operation, `close` enters the reentrancy lock before touching state,
    /// so a gateway that calls back into `close` mid-settlement is rejected
    /// instead of terminating the ledger underneath an open operation.
    ///
    /// The residual backing value (`total_supply * unit_price`) is sent to
    /// the owner through the gateway. A declined residual payout is logged
    /// but does not un-close the ledger — closure is one-way regardless.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`], [`LedgerError::ReentrancyDetected`],
    /// or [`LedgerError::LedgerClosed`].
    pub fn close(&self, caller: &str) -> Result<(), LedgerError> {
        self.access.require_owner(caller)?;

        let _guard = self.lock.enter()?;
        let residual = {
            let mut state = self.state.lock();
            state.require_active()?;
            let residual = state
                .total_supply
                .checked_mul(self.unit_price)
                .ok_or(LedgerError::AmountOverflow)?;
            state.lifecycle = Lifecycle::Closed;
            residual
        };

        if residual > 0 && !self.gateway.send(residual, self.access.owner()) {
            warn!(ledger = %self.id, residual, "gateway declined residual payout on close");
        }
        info!(ledger = %self.id, residual, "ledger closed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read accessors — no admission checks, never fail, valid after close
    // -----------------------------------------------------------------------

    /// Units currently in circulation.
    pub fn total_supply(&self) -> u64 {
        self.state.lock().total_supply
    }

    /// Balance of `account`, or 0 if it has never been referenced.
    pub fn balance_of(&self, account: &str) -> u64 {
        self.state.lock().balance(account)
    }

    /// Asset display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Fixed settlement price per unit.
    pub fn price(&self) -> u64 {
        self.unit_price
    }

    /// Issuance cap.
    pub fn max_supply(&self) -> u64 {
        self.supply.max_supply()
    }

    /// Owner address.
    pub fn owner(&self) -> &str {
        self.access.owner()
    }

    /// Unique instance id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the ledger has been terminally closed.
    pub fn is_closed(&self) -> bool {
        self.state.lock().lifecycle == Lifecycle::Closed
    }

    /// A serializable view of the complete current state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.lock();
        LedgerSnapshot {
            id: self.id,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            owner: self.access.owner().to_string(),
            max_supply: self.supply.max_supply(),
            unit_price: self.unit_price,
            total_supply: state.total_supply,
            lifecycle: state.lifecycle,
            accounts: state.accounts.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gateway::NullSink;

    /// Gateway double with a fixed verdict; records every send.
    struct FixedGateway {
        verdict: bool,
        calls: Mutex<Vec<(u64, String)>>,
    }

    impl FixedGateway {
        fn accepting() -> Arc<Self> {
            Arc::new(Self {
                verdict: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn declining() -> Arc<Self> {
            Arc::new(Self {
                verdict: false,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl PaymentGateway for FixedGateway {
        fn send(&self, amount: u64, recipient: &str) -> bool {
            self.calls.lock().push((amount, recipient.to_string()));
            self.verdict
        }
    }

    fn config() -> LedgerConfig {
        LedgerConfig {
            name: "Aurum Note".into(),
            symbol: "AUR".into(),
            max_supply: 1_000,
            unit_price: 600,
            cooldown_secs: 60,
        }
    }

    fn ledger_with(gateway: Arc<FixedGateway>) -> (Ledger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_at(10_000));
        let ledger = Ledger::with_clock(
            "owner_pk",
            config(),
            gateway,
            Arc::new(NullSink),
            clock.clone(),
        );
        (ledger, clock)
    }

    #[test]
    fn mint_credits_balance_and_supply() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 500).unwrap();
        assert_eq!(ledger.total_supply(), 500);
        assert_eq!(ledger.balance_of("alice_pk"), 500);
    }

    #[test]
    fn mint_by_non_owner_rejected() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        let result = ledger.mint("mallory_pk", "mallory_pk", 1);
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
        assert_eq!(ledger.total_supply(), 0);
    }

    #[test]
    fn mint_past_cap_rejected() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 1_000).unwrap();
        let result = ledger.mint("owner_pk", "alice_pk", 1);
        assert!(matches!(result, Err(LedgerError::SupplyCapExceeded { .. })));
        assert_eq!(ledger.total_supply(), 1_000);
    }

    #[test]
    fn transfer_moves_units() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 100).unwrap();
        ledger.transfer("alice_pk", "bob_pk", 40).unwrap();
        assert_eq!(ledger.balance_of("alice_pk"), 60);
        assert_eq!(ledger.balance_of("bob_pk"), 40);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn transfer_to_null_address_rejected() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 100).unwrap();
        let result = ledger.transfer("alice_pk", "", 10);
        assert!(matches!(result, Err(LedgerError::InvalidAddress)));
        assert_eq!(ledger.balance_of("alice_pk"), 100);
    }

    #[test]
    fn transfer_beyond_balance_rejected() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 10).unwrap();
        let result = ledger.transfer("alice_pk", "bob_pk", 11);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                balance: 10,
                amount: 11,
            })
        ));
    }

    #[test]
    fn transfer_within_cooldown_rejected() {
        let (ledger, clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 100).unwrap();
        ledger.transfer("alice_pk", "bob_pk", 10).unwrap();

        clock.advance(30);
        let result = ledger.transfer("alice_pk", "bob_pk", 10);
        assert!(matches!(result, Err(LedgerError::RateLimited { .. })));

        clock.advance(31); // 61s after the first transfer
        ledger.transfer("alice_pk", "bob_pk", 10).unwrap();
        assert_eq!(ledger.balance_of("bob_pk"), 20);
    }

    #[test]
    fn sell_settles_at_unit_price() {
        let gateway = FixedGateway::accepting();
        let (ledger, _clock) = ledger_with(gateway.clone());
        ledger.mint("owner_pk", "alice_pk", 100).unwrap();

        ledger.sell("alice_pk", 5).unwrap();
        assert_eq!(ledger.balance_of("alice_pk"), 95);
        assert_eq!(ledger.total_supply(), 95);
        assert_eq!(gateway.calls.lock().as_slice(), &[(3_000, "alice_pk".to_string())]);
    }

    #[test]
    fn declined_settlement_leaves_state_unchanged() {
        let gateway = FixedGateway::declining();
        let (ledger, _clock) = ledger_with(gateway);
        ledger.mint("owner_pk", "alice_pk", 100).unwrap();

        let result = ledger.sell("alice_pk", 5);
        assert!(matches!(result, Err(LedgerError::PaymentFailed { .. })));
        assert_eq!(ledger.balance_of("alice_pk"), 100);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn close_is_terminal() {
        let gateway = FixedGateway::accepting();
        let (ledger, clock) = ledger_with(gateway.clone());
        ledger.mint("owner_pk", "alice_pk", 100).unwrap();

        ledger.close("owner_pk").unwrap();
        assert!(ledger.is_closed());
        // Residual backing value went to the owner: 100 units * 600.
        assert_eq!(gateway.calls.lock().as_slice(), &[(60_000, "owner_pk".to_string())]);

        clock.advance(3_600);
        assert!(matches!(
            ledger.transfer("alice_pk", "bob_pk", 1),
            Err(LedgerError::LedgerClosed)
        ));
        assert!(matches!(
            ledger.mint("owner_pk", "alice_pk", 1),
            Err(LedgerError::LedgerClosed)
        ));
        assert!(matches!(
            ledger.sell("alice_pk", 1),
            Err(LedgerError::LedgerClosed)
        ));
        assert!(matches!(
            ledger.close("owner_pk"),
            Err(LedgerError::LedgerClosed)
        ));
        // Reads still answer.
        assert_eq!(ledger.balance_of("alice_pk"), 100);
        assert_eq!(ledger.total_supply(), 100);
    }

    #[test]
    fn close_by_non_owner_rejected() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        let result = ledger.close("mallory_pk");
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
        assert!(!ledger.is_closed());
    }

    #[test]
    fn metadata_accessors() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        assert_eq!(ledger.name(), "Aurum Note");
        assert_eq!(ledger.symbol(), "AUR");
        assert_eq!(ledger.price(), 600);
        assert_eq!(ledger.max_supply(), 1_000);
        assert_eq!(ledger.owner(), "owner_pk");
    }

    #[test]
    fn snapshot_serializes() {
        let (ledger, _clock) = ledger_with(FixedGateway::accepting());
        ledger.mint("owner_pk", "alice_pk", 42).unwrap();
        let snapshot = ledger.snapshot();
        assert_eq!(snapshot.total_supply, 42);
        assert_eq!(snapshot.lifecycle, Lifecycle::Active);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: LedgerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.accounts["alice_pk"].balance, 42);
    }
}
