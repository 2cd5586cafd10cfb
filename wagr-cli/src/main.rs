//! # Wagr CLI
//!
//! Command-line interface for running oracle-settled prediction markets against a local
//! state file.

mod storage;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use wagr_core::{
    utils::*, Address, Clock, EngineConfig, InMemoryLedger, ManualClock, Market, MarketEngine,
    MarketError, OracleSet, SystemClock,
};

use storage::{load_snapshot, save_snapshot, Snapshot, DEFAULT_STATE_FILE};

type Engine = MarketEngine<OracleSet, InMemoryLedger, ManualClock>;

#[derive(Parser)]
#[command(name = "wagr")]
#[command(about = "Oracle-settled parimutuel prediction markets")]
#[command(version)]
struct Cli {
    /// Path to the state file
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    /// Override the current time (unix seconds or RFC 3339)
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise a new deployment with a fixed owner
    Init {
        /// Owner address (hex or label)
        #[arg(short, long)]
        owner: String,
        /// Minimum accepted stake
        #[arg(long, default_value = "1")]
        min_bet: u64,
        /// Require markets to expire before they can be settled
        #[arg(long)]
        settle_after_expiry: bool,
        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },
    /// Show the address derived from a label
    Address {
        label: String,
    },
    /// Credit simulated funds to an address
    Deposit {
        address: String,
        amount: u64,
    },
    /// Show an address's balance
    Balance {
        address: String,
    },
    /// Authorize an oracle (owner only)
    RegisterOracle {
        #[arg(short, long)]
        caller: String,
        oracle: String,
    },
    /// Revoke an oracle (owner only)
    RemoveOracle {
        #[arg(short, long)]
        caller: String,
        oracle: String,
    },
    /// Check whether an address is an oracle
    IsOracle {
        address: String,
    },
    /// Record an oracle's statement of a market result
    VerifyResult {
        #[arg(short, long)]
        caller: String,
        market_id: u64,
        result: usize,
    },
    /// Create a new prediction market
    Create {
        #[arg(short, long)]
        caller: String,
        /// Market question
        #[arg(short, long)]
        description: String,
        /// Outcome label (repeat for each option)
        #[arg(short, long = "option", required = true)]
        options: Vec<String>,
        /// Expiration (unix seconds or RFC 3339)
        #[arg(short, long)]
        expiration: String,
    },
    /// Stake funds on an option
    Bet {
        #[arg(short, long)]
        caller: String,
        market_id: u64,
        option: usize,
        amount: u64,
    },
    /// Record the winning option (oracle only)
    Settle {
        #[arg(short, long)]
        caller: String,
        market_id: u64,
        winning_option: usize,
    },
    /// Claim winnings from a settled market
    Claim {
        #[arg(short, long)]
        caller: String,
        market_id: u64,
    },
    /// Show market information
    Info {
        market_id: u64,
    },
    /// List all markets
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let now = match &cli.now {
        Some(value) => parse_timestamp(value)?,
        None => SystemClock.now(),
    };
    let clock = ManualClock::new(now);

    if let Commands::Init {
        owner,
        min_bet,
        settle_after_expiry,
        force,
    } = &cli.command
    {
        if cli.state.exists() && !force {
            bail!(
                "State file {} already exists (use --force to overwrite)",
                cli.state.display()
            );
        }
        let owner = parse_address(owner)?;
        let config = EngineConfig::new(owner)
            .with_min_bet(*min_bet)
            .with_early_settlement(!settle_after_expiry);
        config.validate()?;
        save_snapshot(&Snapshot::new(config), &cli.state)?;

        info!(owner = %owner, path = %cli.state.display(), "Deployment initialised");
        println!("{}", "Deployment initialised".green().bold());
        println!("{}: {}", "Owner".yellow().bold(), owner);
        println!("{}: {}", "State file".yellow().bold(), cli.state.display());
        return Ok(());
    }

    if let Commands::Address { label } = &cli.command {
        println!(
            "{}: {}",
            "Address".green().bold(),
            Address::from_label(label).to_string().cyan()
        );
        return Ok(());
    }

    let snapshot = load_snapshot(&cli.state)?.with_context(|| {
        format!(
            "No state at {} (run `wagr init --owner <address>` first)",
            cli.state.display()
        )
    })?;
    let mut engine = snapshot.into_engine(clock)?;

    let mutated = run(&mut engine, cli.command)?;
    if mutated {
        save_snapshot(&Snapshot::from_engine(engine), &cli.state)?;
    }
    Ok(())
}

/// Execute a command. Returns whether state changed.
fn run(engine: &mut Engine, command: Commands) -> Result<bool> {
    match command {
        Commands::Init { .. } | Commands::Address { .. } => Ok(false),

        Commands::Deposit { address, amount } => {
            let address = parse_address(&address)?;
            let balance = engine.ledger_mut().credit(address, amount)?;
            println!(
                "{}: {} now holds {}",
                "Deposit".green().bold(),
                address.to_string().cyan(),
                balance.to_string().yellow()
            );
            Ok(true)
        }

        Commands::Balance { address } => {
            let address = parse_address(&address)?;
            println!(
                "{}: {}",
                "Balance".green().bold(),
                engine.ledger().balance_of(&address).to_string().yellow()
            );
            Ok(false)
        }

        Commands::RegisterOracle { caller, oracle } => {
            let caller = parse_address(&caller)?;
            let oracle = parse_address(&oracle)?;
            report(engine.register_oracle(&caller, oracle))?;
            println!("{}: {}", "Oracle registered".green().bold(), oracle);
            Ok(true)
        }

        Commands::RemoveOracle { caller, oracle } => {
            let caller = parse_address(&caller)?;
            let oracle = parse_address(&oracle)?;
            report(engine.remove_oracle(&caller, &oracle))?;
            println!("{}: {}", "Oracle removed".green().bold(), oracle);
            Ok(true)
        }

        Commands::IsOracle { address } => {
            let address = parse_address(&address)?;
            let is_oracle = engine.is_oracle(&address);
            let verdict = if is_oracle { "yes".green() } else { "no".red() };
            println!("{}: {}", "Oracle".yellow().bold(), verdict);
            Ok(false)
        }

        Commands::VerifyResult {
            caller,
            market_id,
            result,
        } => {
            let caller = parse_address(&caller)?;
            report(engine.verify_result(&caller, market_id, result))?;
            println!(
                "{}: market {} result {}",
                "Result attested".green().bold(),
                market_id,
                result
            );
            Ok(true)
        }

        Commands::Create {
            caller,
            description,
            options,
            expiration,
        } => {
            let caller = parse_address(&caller)?;
            let expiration = parse_timestamp(&expiration)?;
            let id = report(engine.create_market(&caller, description, options, expiration))?;

            println!("{}", "Market Created Successfully!".green().bold());
            print_market(engine, id)?;
            Ok(true)
        }

        Commands::Bet {
            caller,
            market_id,
            option,
            amount,
        } => {
            let caller = parse_address(&caller)?;
            report(engine.place_bet(&caller, market_id, option, amount))?;
            let market = engine.market(market_id)?;
            println!(
                "{}: {} on \"{}\" (pool now {}, odds {:.2})",
                "Bet placed".green().bold(),
                amount,
                market.options[option],
                market.pool(option),
                market.odds(option)
            );
            Ok(true)
        }

        Commands::Settle {
            caller,
            market_id,
            winning_option,
        } => {
            let caller = parse_address(&caller)?;
            report(engine.settle_market(&caller, market_id, winning_option))?;
            let summary = engine.settlement_summary(market_id)?;
            println!("{}", "Market settled".green().bold());
            println!("{}: {}", "Total pool".yellow().bold(), summary.total_pool);
            println!("{}: {}", "Winning pool".yellow().bold(), summary.winning_pool);
            println!("{}: {}", "Owed to winners".yellow().bold(), summary.outstanding);
            Ok(true)
        }

        Commands::Claim { caller, market_id } => {
            let caller = parse_address(&caller)?;
            let payout = report(engine.claim_winnings(&caller, market_id))?;
            println!(
                "{}: {}",
                "Winnings claimed".green().bold(),
                payout.to_string().yellow()
            );
            Ok(true)
        }

        Commands::Info { market_id } => {
            print_market(engine, market_id)?;
            Ok(false)
        }

        Commands::List => {
            let now = engine.clock().now();
            let mut empty = true;
            for market in engine.markets() {
                empty = false;
                println!(
                    "{:>4}  {}  {}  {}",
                    market.id.to_string().cyan(),
                    market.creator.short().bright_black(),
                    market.description,
                    market.status_line(now).bright_black()
                );
            }
            if empty {
                println!("{}", "No markets yet.".yellow());
            }
            Ok(false)
        }
    }
}

/// Print the numeric code alongside engine errors.
fn report<T>(result: wagr_core::Result<T>) -> Result<T> {
    result.map_err(|e: MarketError| anyhow::anyhow!("[{}] {}", e.code(), e))
}

/// Accepts a 40-character hex address or derives one from a label.
fn parse_address(input: &str) -> Result<Address> {
    match Address::from_str(input) {
        Ok(address) => Ok(address),
        Err(_) if input.len() != 40 && !input.starts_with("0x") => {
            Ok(Address::from_label(input))
        }
        Err(e) => Err(e.into()),
    }
}

fn print_market(engine: &Engine, market_id: u64) -> Result<()> {
    let market: &Market = engine.market(market_id)?;
    let now = engine.clock().now();
    println!("{}", "═".repeat(50).bright_black());
    println!("{}: {}", "Market ID".yellow().bold(), market.id);
    println!("{}: {}", "Description".yellow().bold(), market.description);
    println!("{}: {}", "Creator".yellow().bold(), market.creator);
    println!(
        "{}: {}",
        "Expiration".yellow().bold(),
        format_timestamp(market.expiration)
    );
    for (index, label) in market.options.iter().enumerate() {
        println!(
            "  [{}] {:<24} pool {:>10}  odds {:.2}",
            index,
            label,
            market.pool(index),
            market.odds(index)
        );
    }
    if let Ok(total) = market.total_pool() {
        println!("{}: {}", "Total pool".yellow().bold(), total);
    }
    println!("{}: {}", "Status".yellow().bold(), market.status_line(now));
    if let Ok(summary) = engine.settlement_summary(market.id) {
        println!("{}: {}", "Paid out".yellow().bold(), summary.paid_out);
        println!("{}: {}", "Outstanding".yellow().bold(), summary.outstanding);
    }
    let attestations = engine.attestations(market.id).count();
    if attestations > 0 {
        println!("{}: {}", "Attestations".yellow().bold(), attestations);
    }
    println!("{}", "═".repeat(50).bright_black());
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wagr=info,wagr_core=info"));

    if std::env::var("WAGR_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
