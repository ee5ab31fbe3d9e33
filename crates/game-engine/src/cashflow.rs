use game_core::{
    validate_cash_flow_config, CashFlowConfig, CashFlowMove, CashFlowRound, MarketEvent, PayTerms,
    ValidationError,
};
use game_econ::{collection_lag_rounds, spike_revenue, supplier_payment};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

use crate::Ruleset;

/// A booked sale waiting to convert to cash.
#[derive(Clone, Debug)]
struct Receivable {
    due_round: u32,
    amount: Decimal,
}

/// Working-capital drill: each round the player orders inventory, extends
/// customer credit, and schedules the supplier payment; random demand and
/// collection events perturb the books. The score is the cash position.
pub struct CashFlow {
    config: CashFlowConfig,
    cash: Decimal,
    inventory: u32,
    receivables: Vec<Receivable>,
    /// Supplier balance carried by a Delay, settled next round with the fee.
    payable: Decimal,
}

impl Ruleset for CashFlow {
    type Config = CashFlowConfig;
    type Decision = CashFlowMove;
    type Record = CashFlowRound;
    type Total = Decimal;

    fn start(config: CashFlowConfig) -> Result<Self, ValidationError> {
        validate_cash_flow_config(&config)?;
        Ok(CashFlow {
            cash: config.opening_cash,
            inventory: config.opening_inventory,
            receivables: Vec::new(),
            payable: Decimal::ZERO,
            config,
        })
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
        _history: &[CashFlowRound],
        decision: CashFlowMove,
        rng: &mut ChaCha8Rng,
    ) -> CashFlowRound {
        let opening = self.cash;

        // Receivables that have come due convert to cash.
        let mut collected = Decimal::ZERO;
        self.receivables.retain(|receivable| {
            if receivable.due_round <= round {
                collected += receivable.amount;
                false
            } else {
                true
            }
        });
        self.cash += collected;

        // A balance delayed last round settles now, late fee included.
        if self.payable > Decimal::ZERO {
            self.cash -= supplier_payment(self.payable, PayTerms::Delay);
            self.payable = Decimal::ZERO;
        }

        // This round's order.
        self.inventory += decision.order_units;
        let order = self.config.unit_cost * Decimal::from(decision.order_units);
        match decision.pay_terms {
            PayTerms::Delay => self.payable = order,
            terms => self.cash -= supplier_payment(order, terms),
        }

        // At most one market event per round: a demand spike moves stock at
        // list price into receivables, or collections slip a round.
        let roll = rng.gen_range(1..=100);
        let mut event = None;
        let mut units_sold = 0;
        if roll <= 20 {
            let (sold, revenue) = spike_revenue(self.inventory, self.config.unit_price);
            self.inventory -= sold;
            units_sold = sold;
            if sold > 0 {
                self.receivables.push(Receivable {
                    due_round: round + collection_lag_rounds(decision.credit_terms.days()),
                    amount: revenue,
                });
            }
            event = Some(MarketEvent::SalesSpike);
        } else if roll <= 30 {
            for receivable in &mut self.receivables {
                receivable.due_round += 1;
            }
            event = Some(MarketEvent::DelayedPayments);
        }

        CashFlowRound {
            round,
            decision,
            event,
            units_sold,
            cash_delta: self.cash - opening,
            closing_cash: self.cash,
        }
    }

    fn payoff(&self, record: &CashFlowRound) -> Decimal {
        record.cash_delta
    }
}
