#![deny(warnings)]

//! Core domain models and invariants for the boardroom round games.
//!
//! This crate defines the serializable types shared across the game variants
//! with validation helpers to guarantee basic invariants before a session is
//! allowed to start.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle phase of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No session configured yet.
    Setup,
    /// Rounds are being played.
    Playing,
    /// The session is over; only the summary remains.
    Results,
}

/// A market-entry move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryDecision {
    /// Enter the market this round.
    Enter,
    /// Sit the round out.
    StayOut,
}

/// Which side of the table a negotiating party occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    /// Makes offers, capped by a hiring budget.
    Employer,
    /// Makes demands, floored by a reservation wage.
    Employee,
}

impl Seat {
    /// The opposite side of the table.
    pub fn other(self) -> Seat {
        match self {
            Seat::Employer => Seat::Employee,
            Seat::Employee => Seat::Employer,
        }
    }
}

/// Entry policies available to rival firms (closed set).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RivalPolicy {
    /// Enters every round.
    AlwaysEnter,
    /// Enters with a fixed probability each round.
    RandomEntry {
        /// Probability of entering, in [0, 1].
        enter_prob: f64,
    },
    /// Copies the player's previous move; flips a fair coin on round 1.
    MirrorPlayer,
    /// Enters while the previous round's payoff was non-negative; enters on
    /// round 1.
    PayoffChaser,
}

/// Concession schedules available to the negotiation counterpart (closed set).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConcessionPolicy {
    /// Repeats the opening proposal every round.
    HoldFirm,
    /// Concedes a fixed amount toward its limit each round.
    LinearConcession {
        /// Per-round concession, must be positive.
        step: Decimal,
    },
    /// Proposes the midpoint of the previous round's two proposals; repeats
    /// the opening on round 1.
    SplitTheDifference,
}

/// Supplier payment scheduling for a cash-flow round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayTerms {
    /// Settle immediately at a small discount.
    PayNow,
    /// Settle this round at face value.
    OnDueDate,
    /// Carry the balance to next round and pay a late fee.
    Delay,
}

/// Customer credit terms offered by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditTerms {
    /// Net 15 days.
    Days15,
    /// Net 30 days.
    Days30,
    /// Net 45 days.
    Days45,
}

impl CreditTerms {
    /// Collection period in days.
    pub fn days(self) -> u16 {
        match self {
            CreditTerms::Days15 => 15,
            CreditTerms::Days30 => 30,
            CreditTerms::Days45 => 45,
        }
    }
}

/// Player move for one cash-flow round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowMove {
    /// Units of inventory to order this round.
    pub order_units: u32,
    /// Credit terms extended to customers this round.
    pub credit_terms: CreditTerms,
    /// How this round's supplier balance is settled.
    pub pay_terms: PayTerms,
}

/// Market events that can fire during a cash-flow round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    /// Demand spike: up to 50 units sell at list price.
    SalesSpike,
    /// Customers slip: outstanding receivables are pushed back a round.
    DelayedPayments,
}

/// One resolved market-entry round. Records are append-only and never
/// mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryRound {
    /// 1-based round number.
    pub round: u32,
    /// The player's move.
    pub player: EntryDecision,
    /// Each rival firm's move, in config order.
    pub rivals: Vec<EntryDecision>,
    /// Total entrants this round, the player included.
    pub entrants: u32,
    /// The player's payoff.
    pub payoff: i64,
}

/// One resolved salary-talks round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TalksRound {
    /// 1-based round number.
    pub round: u32,
    /// The employer's offer.
    pub offer: Decimal,
    /// The employee's demand.
    pub demand: Decimal,
    /// Whether the offer covered the demand.
    pub agreement: bool,
    /// Employer surplus; zero unless the round settled.
    pub employer_payoff: Decimal,
    /// Employee surplus; zero unless the round settled.
    pub employee_payoff: Decimal,
}

/// One resolved cash-flow round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRound {
    /// 1-based round number.
    pub round: u32,
    /// The move the player submitted.
    pub decision: CashFlowMove,
    /// The market event that fired, if any.
    pub event: Option<MarketEvent>,
    /// Units sold this round.
    pub units_sold: u32,
    /// Net cash movement this round.
    pub cash_delta: Decimal,
    /// Cash position after the round.
    pub closing_cash: Decimal,
}

/// Market-entry session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Number of rounds to play (>= 1).
    pub rounds: u32,
    /// Entrant count at which the market is exactly saturated (>= 1).
    pub capacity: u32,
    /// Payoff for entering an uncrowded market (> 0).
    pub entry_payoff: i64,
    /// Payoff for entering a crowded market (< 0).
    pub crowding_loss: i64,
    /// Rival firms and their policies.
    pub rivals: Vec<RivalPolicy>,
    /// RNG seed; `None` seeds from process entropy.
    pub seed: Option<u64>,
}

/// Salary-talks session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TalksConfig {
    /// Maximum number of rounds (>= 1); agreement ends the session early.
    pub rounds: u32,
    /// The seat the player occupies; the policy drives the other seat.
    pub player_seat: Seat,
    /// Value the hire creates for the employer (>= 0).
    pub value_created: Decimal,
    /// Employer's offer ceiling (>= employee reservation).
    pub employer_budget: Decimal,
    /// Employee's demand floor (>= 0).
    pub employee_reservation: Decimal,
    /// Counterpart concession schedule.
    pub counterpart: ConcessionPolicy,
    /// Counterpart's opening proposal; must not cross its own limit.
    pub counterpart_opening: Decimal,
    /// RNG seed; `None` seeds from process entropy.
    pub seed: Option<u64>,
}

/// Cash-flow drill configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashFlowConfig {
    /// Number of rounds to play (>= 1).
    pub rounds: u32,
    /// Starting cash (>= 0).
    pub opening_cash: Decimal,
    /// Starting inventory in units.
    pub opening_inventory: u32,
    /// Supplier price per unit (> 0).
    pub unit_cost: Decimal,
    /// Customer list price per unit (> 0).
    pub unit_price: Decimal,
    /// RNG seed; `None` seeds from process entropy.
    pub seed: Option<u64>,
}

/// Validation errors for session configuration and player input.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Every session needs at least one round.
    #[error("round count must be >= 1")]
    NoRounds,
    /// A saturated market still admits one entrant.
    #[error("market capacity must be >= 1")]
    ZeroCapacity,
    /// Entering an uncrowded market must pay.
    #[error("entry payoff must be positive")]
    NonPositiveEntryPayoff,
    /// Entering a crowded market must cost.
    #[error("crowding loss must be negative")]
    NonNegativeCrowdingLoss,
    /// Entry probability outside [0, 1] or not finite.
    #[error("entry probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
    /// There is no zone of possible agreement.
    #[error("employer budget {budget} is below employee reservation {reservation}")]
    BudgetBelowReservation {
        /// Configured offer ceiling.
        budget: Decimal,
        /// Configured demand floor.
        reservation: Decimal,
    },
    /// Concession schedules must actually concede.
    #[error("concession step must be positive")]
    NonPositiveStep,
    /// The counterpart's opening proposal crosses its own limit.
    #[error("counterpart opening {0} crosses its own limit")]
    OpeningBeyondLimit(Decimal),
    /// Salary proposals must be positive.
    #[error("proposal must be positive")]
    NonPositiveProposal,
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Unit prices must be strictly positive.
    #[error("unit price and unit cost must be > 0")]
    NonPositiveUnitPrice,
}

/// Validate a market-entry configuration.
pub fn validate_entry_config(config: &EntryConfig) -> Result<(), ValidationError> {
    if config.rounds == 0 {
        return Err(ValidationError::NoRounds);
    }
    if config.capacity == 0 {
        return Err(ValidationError::ZeroCapacity);
    }
    if config.entry_payoff <= 0 {
        return Err(ValidationError::NonPositiveEntryPayoff);
    }
    if config.crowding_loss >= 0 {
        return Err(ValidationError::NonNegativeCrowdingLoss);
    }
    for rival in &config.rivals {
        if let RivalPolicy::RandomEntry { enter_prob } = rival {
            if !enter_prob.is_finite() || !(0.0..=1.0).contains(enter_prob) {
                return Err(ValidationError::ProbabilityOutOfRange(*enter_prob));
            }
        }
    }
    Ok(())
}

/// Validate a salary-talks configuration.
///
/// A budget below the reservation wage leaves no zone of possible agreement
/// and is rejected outright; a hire that destroys value (`value_created <
/// employer_budget`) is legal, if unwise.
pub fn validate_talks_config(config: &TalksConfig) -> Result<(), ValidationError> {
    if config.rounds == 0 {
        return Err(ValidationError::NoRounds);
    }
    if config.value_created < Decimal::ZERO
        || config.employer_budget < Decimal::ZERO
        || config.employee_reservation < Decimal::ZERO
    {
        return Err(ValidationError::NegativeMoney);
    }
    if config.employer_budget < config.employee_reservation {
        return Err(ValidationError::BudgetBelowReservation {
            budget: config.employer_budget,
            reservation: config.employee_reservation,
        });
    }
    if let ConcessionPolicy::LinearConcession { step } = &config.counterpart {
        if *step <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveStep);
        }
    }
    if config.counterpart_opening <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveProposal);
    }
    // The counterpart may not open beyond the limit it concedes toward.
    let crosses = match config.player_seat.other() {
        Seat::Employer => config.counterpart_opening > config.employer_budget,
        Seat::Employee => config.counterpart_opening < config.employee_reservation,
    };
    if crosses {
        return Err(ValidationError::OpeningBeyondLimit(config.counterpart_opening));
    }
    Ok(())
}

/// Validate a cash-flow drill configuration.
pub fn validate_cash_flow_config(config: &CashFlowConfig) -> Result<(), ValidationError> {
    if config.rounds == 0 {
        return Err(ValidationError::NoRounds);
    }
    if config.opening_cash < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    if config.unit_cost <= Decimal::ZERO || config.unit_price <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveUnitPrice);
    }
    Ok(())
}
