//! BB84 simulation binary.
//!
//! # Usage
//!
//! ```bash
//! # Run one session and print the table, key, and error rate
//! bb84
//!
//! # Reproducible run with an eavesdropper, ticking every 200 ms
//! bb84 --seed 42 --eavesdropper --interval-ms 200
//!
//! # Drive the session by hand
//! bb84 --interactive
//! ```

use std::time::Duration;

use bb84_cli::{CliError, Driver, SeededEnv, SystemEnv};
use bb84_core::{Environment, SessionConfig};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// BB84 quantum key distribution simulator
#[derive(Parser, Debug)]
#[command(name = "bb84")]
#[command(about = "Simulate BB84 key distribution, with or without an eavesdropper")]
#[command(version)]
struct Args {
    /// Milliseconds between transmissions
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Start with the eavesdropper enabled
    #[arg(short, long)]
    eavesdropper: bool,

    /// Seed for a reproducible run (default: OS randomness)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Read commands from stdin instead of running one session
    #[arg(short, long)]
    interactive: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = SessionConfig::default()
        .with_tick_interval(Duration::from_millis(args.interval_ms))
        .with_eavesdropper(args.eavesdropper);

    match args.seed {
        Some(seed) => {
            tracing::info!(seed, "using seeded randomness");
            run(SeededEnv::with_seed(seed), config, args.interactive).await?;
        },
        None => run(SystemEnv::new(), config, args.interactive).await?,
    }

    Ok(())
}

async fn run<E: Environment>(
    env: E,
    config: SessionConfig,
    interactive: bool,
) -> Result<(), CliError> {
    let mut driver = Driver::new(env, config)?;
    let mut out = std::io::stdout();

    if interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        driver.run_interactive(stdin, &mut out).await
    } else {
        driver.run_session(&mut out).await
    }
}
