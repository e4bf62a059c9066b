//! Wheelhouse command line
//!
//! Plays roulette rounds or lottery draws against the engine and prints the settled results.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use wheelhouse::{
    games::{leaderboard, lottery, rng::RngSource, LotteryPool, SeededRng, SystemRng},
    BetKind, ConfigLoader, GameError, GameSession, RoundResult, WheelhouseConfig,
    WheelhouseResult,
};

#[derive(Parser)]
#[command(name = "wheelhouse")]
#[command(about = "Roulette and fortune-wheel lottery engine")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Seed for reproducible draws
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place bets and spin the roulette wheel
    Roulette {
        /// Bet as KIND=AMOUNT, e.g. 17=100, red=50, 1-18=20
        #[arg(short, long = "bet", value_parser = parse_bet, required = true)]
        bets: Vec<(BetKind, u64)>,

        /// Number of rounds; the bet set is placed again each round
        #[arg(short, long, default_value = "1")]
        rounds: u32,
    },

    /// Draw a lottery winner
    Lottery {
        /// Entrant as NICKNAME=STAKE
        #[arg(short, long = "participant", value_parser = parse_participant, required = true)]
        participants: Vec<(String, u64)>,

        /// Number of draws with the same entrants
        #[arg(short, long, default_value = "1")]
        rounds: u32,
    },

    /// Check that lottery odds do not depend on stake
    Simulate {
        /// Number of participants
        #[arg(short, long, default_value = "4")]
        participants: usize,

        /// Number of draws
        #[arg(short, long, default_value = "100000")]
        draws: u32,
    },
}

fn parse_bet(s: &str) -> Result<(BetKind, u64), String> {
    let (kind, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected KIND=AMOUNT, got '{}'", s))?;
    let kind: BetKind = kind.parse().map_err(|e: GameError| e.to_string())?;
    let amount = amount
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid amount", amount))?;
    Ok((kind, amount))
}

fn parse_participant(s: &str) -> Result<(String, u64), String> {
    let (nickname, stake) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NICKNAME=STAKE, got '{}'", s))?;
    let stake = stake
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid stake", stake))?;
    Ok((nickname.to_string(), stake))
}

fn make_rng(seed: Option<u64>) -> Box<dyn RngSource> {
    match seed {
        Some(seed) => Box::new(SeededRng::new(seed)),
        None => Box::new(SystemRng::new()),
    }
}

fn init_logging(config: &WheelhouseConfig, verbose: bool) {
    let default_filter = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn main() -> WheelhouseResult<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let config = loader.load()?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Roulette { bets, rounds } => run_roulette(&config, cli.seed, &bets, rounds),
        Commands::Lottery { participants, rounds } => {
            run_lottery(&config, cli.seed, &participants, rounds)
        }
        Commands::Simulate { participants, draws } => {
            run_simulation(&config, cli.seed, participants, draws)
        }
    }
}

fn run_roulette(
    config: &WheelhouseConfig,
    seed: Option<u64>,
    bets: &[(BetKind, u64)],
    rounds: u32,
) -> WheelhouseResult<()> {
    let mut session = GameSession::roulette(&config.roulette, make_rng(seed));
    info!(balance = session.balance(), rounds, "Roulette session started");
    println!("Chips: {:?}", session.engine().chip_values());

    for round in 1..=rounds {
        let mut placed = true;
        for (kind, amount) in bets {
            match session.place_bet(*kind, *amount) {
                Ok(_) => {}
                Err(GameError::InsufficientFunds { requested, available }) => {
                    warn!(round, requested, available, "Out of funds");
                    placed = false;
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        if !placed {
            session.clear_bets()?;
            break;
        }

        if let RoundResult::Roulette(outcome) = session.spin()? {
            println!(
                "Round {}: {} | staked {} | paid {} | net {:+} | balance {}",
                round,
                outcome.slot,
                outcome.total_staked,
                outcome.total_payout,
                outcome.net,
                session.balance()
            );
        }
        session.acknowledge()?;
    }

    println!("\nHistory (most recent first):");
    for entry in session.history() {
        if let Some(outcome) = entry.result.as_roulette() {
            println!("  #{} {} paid {}", entry.sequence_id, outcome.slot, outcome.total_payout);
        }
    }
    Ok(())
}

fn run_lottery(
    config: &WheelhouseConfig,
    seed: Option<u64>,
    participants: &[(String, u64)],
    rounds: u32,
) -> WheelhouseResult<()> {
    let mut session = GameSession::lottery(&config.lottery, make_rng(seed));

    for round in 1..=rounds {
        for (nickname, stake) in participants {
            session.add_participant(nickname, *stake)?;
        }

        if let RoundResult::Lottery(outcome) = session.spin()? {
            println!(
                "Draw {}: {} wins {} ({} participants)",
                round, outcome.winner.nickname, outcome.pot, outcome.participant_count
            );
        }
        session.acknowledge()?;
    }

    println!("\nLeaderboard:");
    for (rank, row) in leaderboard::top(session.history_log(), 5).iter().enumerate() {
        println!("  {}. {} won {} in {} draws", rank + 1, row.nickname, row.total_won, row.rounds_won);
    }
    Ok(())
}

fn run_simulation(
    config: &WheelhouseConfig,
    seed: Option<u64>,
    participants: usize,
    draws: u32,
) -> WheelhouseResult<()> {
    let mut pool = LotteryPool::new(&config.lottery);
    for i in 0..participants {
        // Stakes grow tenfold per seat so any stake weighting would show up
        let stake = 10u64.saturating_pow(i as u32 + 1);
        pool.add(&format!("p{}", i + 1), stake)?;
    }
    let entrants = pool.participants().to_vec();
    let mut rng = make_rng(seed);
    let mut wins = vec![0u32; entrants.len()];

    for _ in 0..draws {
        let outcome = lottery::draw(&entrants, rng.as_mut())?;
        if let Some(idx) = entrants.iter().position(|p| p.id == outcome.winner.id) {
            wins[idx] += 1;
        }
    }

    let expected = 1.0 / entrants.len().max(1) as f64;
    println!("{} draws, expected frequency {:.4}", draws, expected);
    for (participant, count) in entrants.iter().zip(wins) {
        println!(
            "  {:>4} stake {:>12} won {:>8} ({:.4})",
            participant.nickname,
            participant.stake,
            count,
            count as f64 / draws.max(1) as f64
        );
    }
    Ok(())
}
