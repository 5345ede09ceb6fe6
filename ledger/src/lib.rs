//! # Aurum Ledger
//!
//! A single-asset accounting ledger with a fixed supply cap, a fixed unit
//! price, per-account rate limiting, and owner-administered issuance. The
//! heart of the crate is the guarded state-transition core: an ordered
//! chain of admission checks (address validity, balance sufficiency,
//! cooldown eligibility, supply cap, ownership) and a reentrancy lock
//! wrapped around the balance and supply mutations they protect.
//!
//! - **[`guard`]** — binary mutual-exclusion flag with RAII release.
//! - **[`access`]** — ownership and null-address admission checks.
//! - **[`cooldown`]** — per-account rate limit; eligibility is consumed at
//!   check time.
//! - **[`supply`]** — immutable issuance cap.
//! - **[`gateway`]** — payment-settlement and event-notification
//!   boundaries, modeled as injected capabilities.
//! - **[`clock`]** — time source abstraction for deterministic tests.
//! - **[`ledger`]** — the composition: `transfer`, `mint`, `sell`,
//!   `close`, and the read accessors.
//!
//! ## Design Principles
//!
//! 1. All monetary arithmetic is checked — wrapping arithmetic and money
//!    do not mix.
//! 2. Lifecycle transitions are explicit enum variants, not boolean flags.
//! 3. A failing admission check aborts the whole operation; callers never
//!    observe a half-applied mutation.
//! 4. External collaborators (settlement, notification, time) are injected
//!    trait objects, substitutable with deterministic test doubles.
//! 5. Every public state type is serializable (serde).

pub mod access;
pub mod clock;
pub mod cooldown;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod ledger;
pub mod supply;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::LedgerError;
pub use gateway::{EventSink, LedgerEvent, LogSink, NullSink, PaymentGateway};
pub use ledger::{Account, Ledger, LedgerConfig, LedgerSnapshot, Lifecycle};
