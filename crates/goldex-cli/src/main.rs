//! Goldex CLI
//!
//! Command-line interface for the GOLD/GBAR economic core.

mod config;
mod simulation;

use clap::{Parser, Subcommand};
use crate::config::{AppConfig, LogFormat, LoggingConfig};
use goldex_core::prelude::*;
use goldex_economics::fee::compute_fee;
use goldex_economics::{convert, PriceQuote};
use crate::simulation::{format_gbar, SimulationParams, SIMULATION_START};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "goldex")]
#[command(author = "Gold Exchange")]
#[command(version)]
#[command(about = "Goldex - GOLD/GBAR stablecoin economics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GOLDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fee charged on a GBAR transfer
    Fee {
        /// Amount in whole GBAR
        amount: u128,
    },

    /// Convert gold grams to USD value and GBAR
    Convert {
        /// Gold in grams
        grams: u128,

        /// XAU/USD per troy ounce with 8 decimals; defaults to the configured price
        #[arg(short, long)]
        price: Option<u128>,
    },

    /// Run a deterministic protocol simulation
    Simulate {
        /// Days to simulate
        #[arg(short, long, default_value = "30")]
        days: u32,

        /// Random GBAR transfers per day
        #[arg(short, long, default_value = "20")]
        transfers: u32,

        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Print the event log as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Print built-in defaults, ignoring file and environment
        #[arg(long)]
        defaults: bool,
    },

    /// Version information
    Version,
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let default_level = if verbose {
        "debug"
    } else {
        logging.level.as_deref().unwrap_or("info")
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false))
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::load(cli.config.as_deref())?;
    init_logging(cli.verbose, &app.logging);

    match cli.command {
        Commands::Fee { amount } => {
            let units = amount
                .checked_mul(ONE_GBAR)
                .ok_or_else(|| anyhow::anyhow!("amount too large: {amount}"))?;
            let fee = compute_fee(units);
            println!("Amount:   {} GBAR", format_gbar(units));
            println!("Fee:      {} GBAR", format_gbar(fee));
            println!("Received: {} GBAR", format_gbar(units - fee));
        }

        Commands::Convert { grams, price } => {
            let price = price.unwrap_or(app.protocol.initial_gold_price as u128);
            let quote = PriceQuote::new(price)?;
            let conversion = convert(grams, &quote)?;
            println!("Gold:           {} g", grams);
            println!("Price per gram: ${}", format_gbar(conversion.price_per_gram));
            println!("Gold value:     ${}", format_gbar(conversion.total_gold_value));
            println!("GBAR:           {}", format_gbar(conversion.gbar_equivalent));
        }

        Commands::Simulate { days, transfers, seed, json } => {
            let params = SimulationParams {
                days,
                transfers_per_day: transfers,
                seed,
                ..SimulationParams::default()
            };
            tracing::info!(days, transfers, seed, "starting simulation");
            let (report, protocol) = simulation::run(app.protocol, &params)?;

            if json {
                println!("{}", protocol.events().to_json()?);
                return Ok(());
            }

            let started = chrono::DateTime::from_timestamp(SIMULATION_START, 0)
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!("╔══════════════════════════════════════════════════════════════╗");
            println!("║                  GOLDEX SIMULATION                           ║");
            println!("╚══════════════════════════════════════════════════════════════╝");
            println!();
            println!("Start:               {}", started);
            println!("Days:                {}", report.days);
            println!("Transfers:           {}", report.transfers);
            println!("Fees collected:      {} GBAR", format_gbar(report.fees_collected));
            println!("Rewards distributed: {} GBAR", format_gbar(report.rewards_distributed));
            println!("Distributor balance: {} GBAR", format_gbar(report.distributor_balance));
            println!("Company share:       {} GBAR", format_gbar(report.company_balance));
            println!("Stabilizations:      {}", report.stabilizations);
            println!("GBAR supply:         {} GBAR", format_gbar(report.gbar_total_supply));
            println!("GBAR vault:          {} GBAR", format_gbar(report.gbar_vault_balance));
            println!("Events:              {}", report.events);
            println!();
            println!("Stakers:");
            for staker in &report.stakers {
                println!(
                    "  {}  staked {} g  claimed {} GBAR",
                    staker.account,
                    staker.staked,
                    format_gbar(staker.claimed)
                );
            }
        }

        Commands::Config { defaults } => {
            if defaults {
                print!("{}", AppConfig::default_toml()?);
            } else {
                print!("{}", toml::to_string_pretty(&app)?);
            }
        }

        Commands::Version => {
            println!("Goldex v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Features:");
            println!("  - GOLD token (1 token = 1 gram)");
            println!("  - GBAR stablecoin, 85% gold-backed");
            println!("  - Tiered transfer fee, capped at 25 GBAR");
            println!("  - 28-day supply stabilization");
            println!("  - GOLD staking with daily GBAR rewards");
            println!("  - Multi-guard retrieval requests");
        }
    }

    Ok(())
}
