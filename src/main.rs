use anyhow::Context;
use clap::Parser;
use reimburse::application::estimation::ReimbursementEngine;
use reimburse::config::Config;
use reimburse::domain::trip::{ReferenceSet, TripInput};
use reimburse::infrastructure::{load_engine_config, load_reference_set};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Predict the reimbursement for one business trip",
    long_about = None,
    allow_negative_numbers = true
)]
struct Args {
    /// Trip duration in days (integer >= 1)
    days: i64,

    /// Miles traveled
    miles: f64,

    /// Total receipts amount
    receipts: f64,

    /// Print the full prediction trace as JSON instead of the amount
    #[arg(long)]
    explain: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries only the amount.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let input = TripInput::new(args.days, args.miles, args.receipts)?;

    let engine_config = load_engine_config(config.engine_config.as_deref())?;
    let examples = if config.reference_data.exists() {
        load_reference_set(&config.reference_data)?
    } else {
        warn!(
            "Reference data {:?} not found; edge-case trips cannot be predicted",
            config.reference_data
        );
        ReferenceSet::default()
    };
    let engine = ReimbursementEngine::new(&engine_config, examples)
        .context("Failed to build reimbursement engine")?;

    if args.explain {
        let trace = engine.explain(&input)?;
        println!("{}", serde_json::to_string_pretty(&trace)?);
    } else {
        println!("{}", engine.predict(&input)?);
    }
    Ok(())
}
