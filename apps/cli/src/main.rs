#![deny(warnings)]

//! Headless CLI playing scripted sessions of the round games.

use anyhow::{bail, Context, Result};
use game_core::{
    CashFlowConfig, CashFlowMove, ConcessionPolicy, CreditTerms, EntryConfig, EntryDecision,
    PayTerms, Phase, RivalPolicy, Seat, TalksConfig,
};
use game_engine::{CashFlow, MarketEntry, Negotiation, Session};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// A session scenario loadable from a YAML file.
#[derive(Debug, Deserialize)]
#[serde(tag = "game", content = "config", rename_all = "snake_case")]
enum Scenario {
    Entry(EntryConfig),
    Talks(TalksConfig),
    CashFlow(CashFlowConfig),
}

struct Args {
    game: String,
    rounds: Option<u32>,
    seed: Option<u64>,
    scenario: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        game: "entry".to_string(),
        rounds: None,
        seed: None,
        scenario: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--game" => {
                if let Some(v) = it.next() {
                    args.game = v;
                }
            }
            "--rounds" => args.rounds = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--scenario" => args.scenario = it.next(),
            _ => {}
        }
    }
    args
}

fn default_entry() -> EntryConfig {
    EntryConfig {
        rounds: 5,
        capacity: 3,
        entry_payoff: 100,
        crowding_loss: -50,
        rivals: vec![
            RivalPolicy::AlwaysEnter,
            RivalPolicy::RandomEntry { enter_prob: 0.6 },
            RivalPolicy::MirrorPlayer,
            RivalPolicy::PayoffChaser,
        ],
        seed: None,
    }
}

fn default_talks() -> TalksConfig {
    TalksConfig {
        rounds: 5,
        player_seat: Seat::Employer,
        value_created: Decimal::new(150_000, 0),
        employer_budget: Decimal::new(120_000, 0),
        employee_reservation: Decimal::new(90_000, 0),
        counterpart: ConcessionPolicy::LinearConcession {
            step: Decimal::new(5_000, 0),
        },
        counterpart_opening: Decimal::new(110_000, 0),
        seed: None,
    }
}

fn default_cash_flow() -> CashFlowConfig {
    CashFlowConfig {
        rounds: 12,
        opening_cash: Decimal::new(100_000, 0),
        opening_inventory: 500,
        unit_cost: Decimal::new(100, 0),
        unit_price: Decimal::new(150, 0),
        seed: None,
    }
}

/// The scripted player proposal for a talks round: an employer climbs from
/// 70% of budget, an employee descends from 140% of reservation.
fn scripted_proposal(seat: Seat, budget: Decimal, reservation: Decimal, round: u32) -> Decimal {
    match seat {
        Seat::Employer => {
            let pct = Decimal::new(70 + 6 * i64::from(round - 1), 2);
            (budget * pct).min(budget)
        }
        Seat::Employee => {
            let pct = Decimal::new((140 - 10 * i64::from(round - 1)).max(100), 2);
            (reservation * pct).max(reservation)
        }
    }
}

fn run_entry(config: EntryConfig) -> Result<()> {
    let rounds = config.rounds;
    let mut session = Session::<MarketEntry>::new();
    session.start(config)?;
    for _ in 0..rounds {
        let record = session.submit_round(EntryDecision::Enter)?;
        info!(
            round = record.round,
            entrants = record.entrants,
            payoff = record.payoff,
            "round resolved"
        );
    }
    let summary = session.summary()?;
    println!(
        "Market entry | rounds: {} | total payoff: {}",
        summary.rounds.len(),
        summary.total
    );
    for r in &summary.rounds {
        println!(
            "  round {} | player: {:?} | entrants: {} | payoff: {}",
            r.round, r.player, r.entrants, r.payoff
        );
    }
    Ok(())
}

fn run_talks(config: TalksConfig) -> Result<()> {
    let rounds = config.rounds;
    let seat = config.player_seat;
    let budget = config.employer_budget;
    let reservation = config.employee_reservation;
    let mut session = Session::<Negotiation>::new();
    session.start(config)?;
    for round in 1..=rounds {
        if session.phase() != Phase::Playing {
            break;
        }
        let proposal = scripted_proposal(seat, budget, reservation, round);
        let record = session.submit_round(proposal)?;
        info!(
            round = record.round,
            offer = %record.offer,
            demand = %record.demand,
            agreement = record.agreement,
            "round resolved"
        );
    }
    let agreed = session.agreement_reached();
    let summary = session.summary()?;
    println!(
        "Salary talks | rounds played: {} | agreement: {} | player surplus: {}",
        summary.rounds.len(),
        agreed,
        summary.total
    );
    for r in &summary.rounds {
        println!(
            "  round {} | offer: {} | demand: {} | agreed: {}",
            r.round, r.offer, r.demand, r.agreement
        );
    }
    Ok(())
}

fn run_cash_flow(config: CashFlowConfig) -> Result<()> {
    let rounds = config.rounds;
    let opening_cash = config.opening_cash;
    let mut session = Session::<CashFlow>::new();
    session.start(config)?;
    let stock_up = CashFlowMove {
        order_units: 20,
        credit_terms: CreditTerms::Days30,
        pay_terms: PayTerms::OnDueDate,
    };
    for _ in 0..rounds {
        let record = session.submit_round(stock_up)?;
        info!(
            round = record.round,
            event = ?record.event,
            cash = %record.closing_cash,
            "round resolved"
        );
    }
    let summary = session.summary()?;
    println!(
        "Cash-flow drill | rounds: {} | opening cash: {} | score: {}",
        summary.rounds.len(),
        opening_cash,
        opening_cash + summary.total
    );
    for r in &summary.rounds {
        println!(
            "  round {} | sold: {} | delta: {} | closing: {}",
            r.round, r.units_sold, r.cash_delta, r.closing_cash
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(game = %args.game, rounds = ?args.rounds, seed = ?args.seed, "starting CLI");

    let mut scenario = match &args.scenario {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {path}"))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing scenario {path}"))?
        }
        None => match args.game.as_str() {
            "entry" => Scenario::Entry(default_entry()),
            "talks" => Scenario::Talks(default_talks()),
            "cashflow" => Scenario::CashFlow(default_cash_flow()),
            other => bail!("unknown game: {other} (expected entry, talks, or cashflow)"),
        },
    };

    match &mut scenario {
        Scenario::Entry(config) => {
            if let Some(rounds) = args.rounds {
                config.rounds = rounds;
            }
            if args.seed.is_some() {
                config.seed = args.seed;
            }
        }
        Scenario::Talks(config) => {
            if let Some(rounds) = args.rounds {
                config.rounds = rounds;
            }
            if args.seed.is_some() {
                config.seed = args.seed;
            }
        }
        Scenario::CashFlow(config) => {
            if let Some(rounds) = args.rounds {
                config.rounds = rounds;
            }
            if args.seed.is_some() {
                config.seed = args.seed;
            }
        }
    }

    match scenario {
        Scenario::Entry(config) => run_entry(config),
        Scenario::Talks(config) => run_talks(config),
        Scenario::CashFlow(config) => run_cash_flow(config),
    }
}
