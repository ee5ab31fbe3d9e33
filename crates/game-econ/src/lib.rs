#![deny(warnings)]

//! Payoff arithmetic for the round games.
//!
//! This module provides the deterministic tables behind each variant:
//! - Market-entry payoff under a capacity threshold
//! - Salary settlement and the surplus split on agreement
//! - Supplier payment and receivable collection for the cash-flow drill
//!
//! Everything here is a total function over inputs the config validators in
//! `game-core` have already admitted.

use game_core::{EntryDecision, PayTerms};
use rust_decimal::Decimal;

/// Units moved by a single sales spike.
pub const SPIKE_UNITS: u32 = 50;

/// Market-entry payoff table.
///
/// Entering pays `reward` while total entrants stay at or under `capacity`
/// and costs `loss` once the market is crowded; staying out is always worth
/// zero, whatever the rivals do.
///
/// Example:
/// let p = entry_payoff(EntryDecision::Enter, 3, 3, 100, -50);
/// assert_eq!(p, 100);
pub fn entry_payoff(
    decision: EntryDecision,
    entrants: u32,
    capacity: u32,
    reward: i64,
    loss: i64,
) -> i64 {
    match decision {
        EntryDecision::StayOut => 0,
        EntryDecision::Enter if entrants <= capacity => reward,
        EntryDecision::Enter => loss,
    }
}

/// Bilateral settlement comparator: agreement is reached iff the offer
/// covers the demand, and the deal closes at the demand.
///
/// Example:
/// let s = settlement(Decimal::new(120_000, 0), Decimal::new(100_000, 0));
/// assert_eq!(s, Some(Decimal::new(100_000, 0)));
pub fn settlement(offer: Decimal, demand: Decimal) -> Option<Decimal> {
    (offer >= demand).then_some(demand)
}

/// Employer surplus from a settled hire: value created minus the settlement.
pub fn employer_surplus(value_created: Decimal, settlement: Decimal) -> Decimal {
    value_created - settlement
}

/// Employee surplus from a settled hire: settlement over the reservation
/// wage.
pub fn employee_surplus(settlement: Decimal, reservation: Decimal) -> Decimal {
    settlement - reservation
}

/// Amount actually paid when a supplier balance is settled under the given
/// terms: a 2% discount for paying early, face value on the due date, a 2%
/// late fee for a balance that was carried.
///
/// Example:
/// let paid = supplier_payment(Decimal::new(1000, 0), PayTerms::PayNow);
/// assert_eq!(paid, Decimal::new(98_000, 2));
pub fn supplier_payment(balance: Decimal, terms: PayTerms) -> Decimal {
    let factor = match terms {
        PayTerms::PayNow => Decimal::new(98, 2),
        PayTerms::OnDueDate => Decimal::ONE,
        PayTerms::Delay => Decimal::new(102, 2),
    };
    balance * factor
}

/// Revenue from a sales spike: up to [`SPIKE_UNITS`] units move at the list
/// price. Returns `(units_sold, revenue)`.
pub fn spike_revenue(inventory: u32, unit_price: Decimal) -> (u32, Decimal) {
    let sold = inventory.min(SPIKE_UNITS);
    (sold, unit_price * Decimal::from(sold))
}

/// Rounds until receivables booked under the given credit terms convert to
/// cash. One round covers 30 days; partial rounds round up.
pub fn collection_lag_rounds(collection_days: u16) -> u32 {
    u32::from(collection_days).div_ceil(30)
}
