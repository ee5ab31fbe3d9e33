use game_ai::rival_decision;
use game_core::{validate_entry_config, EntryConfig, EntryDecision, EntryRound, ValidationError};
use game_econ::entry_payoff;
use rand_chacha::ChaCha8Rng;

use crate::Ruleset;

/// Market-entry ruleset: ENTER pays while total entrants stay at or under
/// the configured capacity, costs once the market is crowded, and STAY_OUT
/// is always worth zero.
pub struct MarketEntry {
    config: EntryConfig,
}

impl Ruleset for MarketEntry {
    type Config = EntryConfig;
    type Decision = EntryDecision;
    type Record = EntryRound;
    type Total = i64;

    fn start(config: EntryConfig) -> Result<Self, ValidationError> {
        validate_entry_config(&config)?;
        Ok(MarketEntry { config })
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    fn rounds(&self) -> u32 {
        self.config.rounds
    }

    fn play(
        &mut self,
        round: u32,
        history: &[EntryRound],
        decision: EntryDecision,
        rng: &mut ChaCha8Rng,
    ) -> EntryRound {
        let rivals: Vec<EntryDecision> = self
            .config
            .rivals
            .iter()
            .map(|policy| rival_decision(policy, round, history, rng))
            .collect();
        let entrants = rivals
            .iter()
            .filter(|d| **d == EntryDecision::Enter)
            .count() as u32
            + u32::from(decision == EntryDecision::Enter);
        let payoff = entry_payoff(
            decision,
            entrants,
            self.config.capacity,
            self.config.entry_payoff,
            self.config.crowding_loss,
        );
        EntryRound {
            round,
            player: decision,
            rivals,
            entrants,
            payoff,
        }
    }

    fn payoff(&self, record: &EntryRound) -> i64 {
        record.payoff
    }
}
