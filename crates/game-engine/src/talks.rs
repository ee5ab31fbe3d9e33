use game_ai::counter_proposal;
use game_core::{validate_talks_config, Seat, TalksConfig, TalksRound, ValidationError};
use game_econ::{employee_surplus, employer_surplus, settlement};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

use crate::{Ruleset, Session};

/// Salary-negotiation ruleset.
///
/// Each round the player submits a proposal for their seat and the
/// counterpart's schedule produces the other one. Agreement is reached iff
/// the offer covers the demand; the deal then closes at the demand, both
/// surpluses are recorded, and the session ends immediately. Running out of
/// rounds leaves both sides with nothing.
pub struct Negotiation {
    config: TalksConfig,
}

impl Negotiation {
    fn counterpart_limit(&self) -> Decimal {
        match self.config.player_seat.other() {
            Seat::Employer => self.config.employer_budget,
            Seat::Employee => self.config.employee_reservation,
        }
    }
}

impl Ruleset for Negotiation {
    type Config = TalksConfig;
    type Decision = Decimal;
    type Record = TalksRound;
    type Total = Decimal;

    fn start(config: TalksConfig) -> Result<Self, ValidationError> {
        validate_talks_config(&config)?;
        Ok(Negotiation { config })
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    fn rounds(&self) -> u32 {
        self.config.rounds
    }

    fn check(&self, proposal: &Decimal) -> Result<(), ValidationError> {
        if *proposal <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveProposal);
        }
        Ok(())
    }

    fn play(
        &mut self,
        round: u32,
        history: &[TalksRound],
        proposal: Decimal,
        _rng: &mut ChaCha8Rng,
    ) -> TalksRound {
        let counterpart_seat = self.config.player_seat.other();
        let counter = counter_proposal(
            &self.config.counterpart,
            counterpart_seat,
            round,
            history,
            self.config.counterpart_opening,
            self.counterpart_limit(),
        );
        let (offer, demand) = match self.config.player_seat {
            Seat::Employer => (proposal, counter),
            Seat::Employee => (counter, proposal),
        };
        match settlement(offer, demand) {
            Some(settled) => TalksRound {
                round,
                offer,
                demand,
                agreement: true,
                employer_payoff: employer_surplus(self.config.value_created, settled),
                employee_payoff: employee_surplus(settled, self.config.employee_reservation),
            },
            None => TalksRound {
                round,
                offer,
                demand,
                agreement: false,
                employer_payoff: Decimal::ZERO,
                employee_payoff: Decimal::ZERO,
            },
        }
    }

    fn payoff(&self, record: &TalksRound) -> Decimal {
        match self.config.player_seat {
            Seat::Employer => record.employer_payoff,
            Seat::Employee => record.employee_payoff,
        }
    }

    fn is_terminal(&self, record: &TalksRound) -> bool {
        record.agreement
    }
}

impl Session<Negotiation> {
    /// Whether any round settled. Meaningful in any phase; `false` while
    /// nothing has been agreed.
    pub fn agreement_reached(&self) -> bool {
        self.history().iter().any(|record| record.agreement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use game_core::{ConcessionPolicy, Phase};

    fn employer_config() -> TalksConfig {
        TalksConfig {
            rounds: 5,
            player_seat: Seat::Employer,
            value_created: Decimal::new(150_000, 0),
            employer_budget: Decimal::new(130_000, 0),
            employee_reservation: Decimal::new(90_000, 0),
            counterpart: ConcessionPolicy::HoldFirm,
            counterpart_opening: Decimal::new(100_000, 0),
            seed: Some(3),
        }
    }

    #[test]
    fn covering_offer_settles_at_the_demand() {
        let mut session = Session::<Negotiation>::new();
        session.start(employer_config()).unwrap();
        let record = session
            .submit_round(Decimal::new(120_000, 0))
            .unwrap();
        assert!(record.agreement);
        assert_eq!(record.demand, Decimal::new(100_000, 0));
        assert_eq!(record.employer_payoff, Decimal::new(50_000, 0));
        assert_eq!(record.employee_payoff, Decimal::new(10_000, 0));
        // Agreement ends the session with four rounds to spare.
        assert_eq!(session.phase(), Phase::Results);
        assert!(session.agreement_reached());
        let summary = session.summary().unwrap();
        assert_eq!(summary.rounds.len(), 1);
        assert_eq!(summary.total, Decimal::new(50_000, 0));
    }

    #[test]
    fn lowball_offers_run_out_the_clock() {
        let mut session = Session::<Negotiation>::new();
        session.start(employer_config()).unwrap();
        for _ in 0..5 {
            let record = session.submit_round(Decimal::new(80_000, 0)).unwrap();
            assert!(!record.agreement);
        }
        assert_eq!(session.phase(), Phase::Results);
        assert!(!session.agreement_reached());
        let summary = session.summary().unwrap();
        assert_eq!(summary.rounds.len(), 5);
        assert_eq!(summary.total, Decimal::ZERO);
        assert!(summary
            .rounds
            .iter()
            .all(|r| r.employer_payoff == Decimal::ZERO && r.employee_payoff == Decimal::ZERO));
    }

    #[test]
    fn employee_seat_collects_the_other_surplus() {
        let mut config = employer_config();
        config.player_seat = Seat::Employee;
        // Employer counterpart opens at 95k and holds; the player demands
        // less than that, so round 1 settles at the demand.
        config.counterpart_opening = Decimal::new(95_000, 0);
        let mut session = Session::<Negotiation>::new();
        session.start(config).unwrap();
        let record = session.submit_round(Decimal::new(92_000, 0)).unwrap();
        assert!(record.agreement);
        assert_eq!(record.offer, Decimal::new(95_000, 0));
        assert_eq!(record.demand, Decimal::new(92_000, 0));
        assert_eq!(record.employee_payoff, Decimal::new(2_000, 0));
        assert_eq!(session.summary().unwrap().total, Decimal::new(2_000, 0));
    }

    #[test]
    fn conceding_counterpart_meets_a_patient_player() {
        let mut config = employer_config();
        config.counterpart = ConcessionPolicy::LinearConcession {
            step: Decimal::new(4_000, 0),
        };
        // Demands walk down 100k, 96k, 92k while the player stands at 93k.
        let mut session = Session::<Negotiation>::new();
        session.start(config).unwrap();
        let offer = Decimal::new(93_000, 0);
        assert!(!session.submit_round(offer).unwrap().agreement);
        assert!(!session.submit_round(offer).unwrap().agreement);
        let third = session.submit_round(offer).unwrap();
        assert!(third.agreement);
        assert_eq!(third.demand, Decimal::new(92_000, 0));
        assert_eq!(session.phase(), Phase::Results);
    }

    #[test]
    fn no_zopa_config_is_rejected() {
        let mut config = employer_config();
        config.employer_budget = Decimal::new(80_000, 0);
        config.counterpart_opening = Decimal::new(95_000, 0);
        let mut session = Session::<Negotiation>::new();
        assert!(matches!(
            session.start(config),
            Err(EngineError::Invalid(
                ValidationError::BudgetBelowReservation { .. }
            ))
        ));
        assert_eq!(session.phase(), Phase::Setup);
    }

    #[test]
    fn nonpositive_proposal_is_rejected_in_place() {
        let mut session = Session::<Negotiation>::new();
        session.start(employer_config()).unwrap();
        assert_eq!(
            session.submit_round(Decimal::ZERO),
            Err(EngineError::Invalid(ValidationError::NonPositiveProposal))
        );
        // The round was not consumed.
        assert_eq!(session.current_round(), Some(1));
        assert!(session.history().is_empty());
    }
}
