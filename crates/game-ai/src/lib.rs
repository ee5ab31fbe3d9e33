#![deny(warnings)]

//! Counterpart decision policies.
//!
//! Rival firms and negotiation counterparts are driven by pure functions
//! over `(round, history)`. Policies that look one round back treat round 1
//! as an explicit special case instead of reading past the start of the
//! history.

use game_core::{ConcessionPolicy, EntryDecision, EntryRound, RivalPolicy, Seat, TalksRound};
use rand::Rng;
use rust_decimal::Decimal;

/// Decide a rival firm's move for `round` (1-based) given the immutable
/// history of resolved rounds.
///
/// Round 1 defaults: `MirrorPlayer` flips a fair coin, `PayoffChaser`
/// enters.
pub fn rival_decision(
    policy: &RivalPolicy,
    round: u32,
    history: &[EntryRound],
    rng: &mut impl Rng,
) -> EntryDecision {
    let previous = round
        .checked_sub(2)
        .and_then(|i| history.get(i as usize));
    match policy {
        RivalPolicy::AlwaysEnter => EntryDecision::Enter,
        RivalPolicy::RandomEntry { enter_prob } => {
            if rng.gen_bool(*enter_prob) {
                EntryDecision::Enter
            } else {
                EntryDecision::StayOut
            }
        }
        RivalPolicy::MirrorPlayer => match previous {
            Some(prev) => prev.player,
            None => {
                if rng.gen_bool(0.5) {
                    EntryDecision::Enter
                } else {
                    EntryDecision::StayOut
                }
            }
        },
        RivalPolicy::PayoffChaser => match previous {
            Some(prev) if prev.payoff < 0 => EntryDecision::StayOut,
            _ => EntryDecision::Enter,
        },
    }
}

/// Counterpart proposal for a talks round.
///
/// `seat` is the seat the counterpart occupies; `limit` is the boundary it
/// concedes toward (the employer's budget ceiling or the employee's
/// reservation floor). Proposals never cross the limit. Round 1 repeats the
/// opening for every schedule.
pub fn counter_proposal(
    policy: &ConcessionPolicy,
    seat: Seat,
    round: u32,
    history: &[TalksRound],
    opening: Decimal,
    limit: Decimal,
) -> Decimal {
    let clamp = |proposal: Decimal| match seat {
        Seat::Employer => proposal.min(limit),
        Seat::Employee => proposal.max(limit),
    };
    match policy {
        ConcessionPolicy::HoldFirm => opening,
        ConcessionPolicy::LinearConcession { step } => {
            let conceded = *step * Decimal::from(round.saturating_sub(1));
            let moved = match seat {
                Seat::Employer => opening + conceded,
                Seat::Employee => opening - conceded,
            };
            clamp(moved)
        }
        ConcessionPolicy::SplitTheDifference => {
            let previous = round
                .checked_sub(2)
                .and_then(|i| history.get(i as usize));
            match previous {
                None => opening,
                Some(prev) => {
                    let (own_last, player_last) = match seat {
                        Seat::Employer => (prev.offer, prev.demand),
                        Seat::Employee => (prev.demand, prev.offer),
                    };
                    clamp((own_last + player_last) / Decimal::TWO)
                }
            }
        }
    }
}
