//! Walkthrough of the full ledger lifecycle: construction, owner-gated
//! issuance, a rate-limited transfer, a gateway-settled sell, and the
//! terminal close.
//!
//! Run with:
//!   cargo run --example quickstart

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use aurum_ledger::{Clock, Ledger, LedgerConfig, LogSink, ManualClock, PaymentGateway};

/// A gateway that always settles, printing each payout it performs.
struct ConsoleGateway;

impl PaymentGateway for ConsoleGateway {
    fn send(&self, amount: u64, recipient: &str) -> bool {
        println!("  [gateway] settled {amount} to {recipient}");
        true
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // A manual clock lets the walkthrough jump past the cooldown window.
    let clock = Arc::new(ManualClock::starting_at(1_700_000_000));
    let ledger = Ledger::with_clock(
        "owner_pk",
        LedgerConfig {
            name: "Aurum Note".into(),
            symbol: "AUR".into(),
            max_supply: 1_000_000,
            unit_price: 600,
            cooldown_secs: 60,
        },
        Arc::new(ConsoleGateway),
        Arc::new(LogSink),
        clock.clone(),
    );

    println!("{} ({}) — cap {}, unit price {}", ledger.name(), ledger.symbol(), ledger.max_supply(), ledger.price());

    // Owner issues the initial supply.
    ledger.mint("owner_pk", "alice_pk", 10_000)?;
    println!("minted 10000 to alice_pk (supply: {})", ledger.total_supply());

    // Alice pays Bob.
    ledger.transfer("alice_pk", "bob_pk", 2_500)?;
    println!("alice_pk -> bob_pk: 2500");

    // A second transfer inside the cooldown window is rejected.
    if let Err(err) = ledger.transfer("alice_pk", "bob_pk", 1) {
        println!("immediate retry rejected: {err}");
    }

    // After the window elapses, Alice liquidates part of her holding.
    clock.advance(61);
    ledger.sell("alice_pk", 500)?;
    println!(
        "alice_pk sold 500 (balance: {}, supply: {})",
        ledger.balance_of("alice_pk"),
        ledger.total_supply()
    );

    // The owner winds the ledger down; the residual backing value is
    // returned through the gateway.
    ledger.close("owner_pk")?;
    println!("ledger closed at {} — further operations are inert", clock.now());

    Ok(())
}
