// crates/stakex-sim/src/main.rs
//
// Binary entrypoint for the Stakex simulator.
//
// Initializes tracing, parses CLI arguments, and either replays a scenario
// file against an in-memory ledger or runs the standalone profit
// calculator.

mod config;
mod events;
mod output;
mod scenario;
mod shared;

use clap::{Parser, Subcommand};
use config::{span_secs, ScenarioConfig};
use output::OutputFormat;
use scenario::Simulation;

use stakex_core::Clock;
use stakex_economics::{Rate, SystemClock, TokenAmount};

/// Stakex: fixed-rate, time-locked staking simulator.
#[derive(Parser, Debug)]
#[command(name = "stakex", version = "0.1.0", about = "Fixed-rate staking simulator")]
struct Cli {
    /// Log level override: trace, debug, info, warn, error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a TOML scenario and print the resulting state.
    Run {
        /// Path to the scenario file.
        #[arg(long)]
        scenario: String,

        /// Report format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Start the simulated clock at the current wall-clock time instead
        /// of the scenario's `start_time`.
        #[arg(long)]
        start_now: bool,
    },

    /// Compute the profit a deposit earns in one staking period.
    Accrue {
        /// Deposit, in tokens (e.g. "100" or "0.5").
        #[arg(long)]
        amount: String,

        /// Rate numerator.
        #[arg(long)]
        rate: u128,

        /// Rate precision; the denominator is 10^(rate_decimal + 2).
        #[arg(long, default_value_t = 0)]
        rate_decimal: u8,

        /// Days elapsed since the period started.
        #[arg(long)]
        elapsed: u64,

        /// Package lock duration, in days.
        #[arg(long)]
        lock: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run {
            scenario,
            format,
            start_now,
        } => {
            let path = expand_tilde(scenario);
            let mut config = ScenarioConfig::load(&path)?;
            if *start_now {
                config.start_time = SystemClock.now();
            }
            let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
            init_tracing(&level);

            tracing::info!("Stakex simulator v0.1.0");
            tracing::info!("Scenario: {} ({} steps)", path, config.steps.len());
            tracing::info!("Start time: {}", config.start_time);

            let mut sim = Simulation::from_config(&config)?;
            let logger = tokio::spawn(events::log_events(sim.shared().subscribe()));

            let report = sim.run(&config.steps).await;
            tracing::info!(
                "Staking reserve holds {} units",
                sim.shared().reserve_balance().await
            );
            if report.reverted() > 0 {
                tracing::warn!("{} of {} steps reverted", report.reverted(), report.outcomes.len());
            }

            // Dropping the simulation closes the channel so the logger drains and exits.
            drop(sim);
            logger.await?;

            println!("{}", output::render_report(&report, *format));
        }
        Commands::Accrue {
            amount,
            rate,
            rate_decimal,
            elapsed,
            lock,
        } => {
            init_tracing(cli.log_level.as_deref().unwrap_or("warn"));

            let principal: TokenAmount = amount.parse()?;
            let rate = Rate::new(*rate, *rate_decimal)?;
            let profit = rate.accrue(principal.units, span_secs(*elapsed, 0), span_secs(*lock, 0))?;
            let full = rate.fee_of(principal.units)?;

            println!("Principal:   {}", principal);
            println!("Rate:        {}/{}", rate.rate, rate.denominator());
            println!("Elapsed:     {} of {} days", elapsed, lock);
            println!("Profit:      {}", TokenAmount::from_units(profit));
            println!("Full period: {}", TokenAmount::from_units(full));
        }
    }

    Ok(())
}

/// Initialize the tracing subscriber; `RUST_LOG` wins over `default_level`.
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_format() {
        let cli = Cli::try_parse_from([
            "stakex",
            "--log-level",
            "debug",
            "run",
            "--scenario",
            "scenarios/demo.toml",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Run {
                scenario,
                format,
                start_now,
            } => {
                assert_eq!(scenario, "scenarios/demo.toml");
                assert_eq!(format, OutputFormat::Json);
                assert!(!start_now);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_run_start_now() {
        let cli = Cli::try_parse_from(["stakex", "run", "--scenario", "s.toml", "--start-now"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { start_now: true, .. }));
    }

    #[test]
    fn test_expand_tilde_leaves_relative_paths() {
        assert_eq!(expand_tilde("scenarios/demo.toml"), "scenarios/demo.toml");
    }
}
