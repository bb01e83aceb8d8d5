use anyhow::Context;
use clap::Parser;
use reimburse::application::estimation::{LinearBaseline, ReimbursementEngine};
use reimburse::application::evaluation::{EvaluationReporter, Evaluator};
use reimburse::config::Config;
use reimburse::infrastructure::{load_engine_config, load_reference_set};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Score the engine against the labeled reference cases", long_about = None)]
struct Args {
    /// Reference dataset (defaults to REIMBURSE_REFERENCE_DATA)
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Engine configuration TOML (defaults to REIMBURSE_ENGINE_CONFIG, then built-ins)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of worst cases to list (defaults to REIMBURSE_WORST_CASES)
    #[arg(short, long)]
    worst: Option<usize>,

    /// Also score the bare linear formula for comparison
    #[arg(long)]
    baseline: bool,

    /// Write the summary as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write every case as CSV to this file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let env_config = Config::from_env()?;

    let cases_path = args.cases.unwrap_or(env_config.reference_data);
    let config_path = args.config.or(env_config.engine_config);
    let worst = args.worst.unwrap_or(env_config.worst_cases);

    let engine_config = load_engine_config(config_path.as_deref())?;
    let examples = load_reference_set(&cases_path)?;
    let engine = ReimbursementEngine::new(&engine_config, examples.clone())
        .context("Failed to build reimbursement engine")?;

    let reporter = EvaluationReporter::default();
    reporter.print_header(
        &cases_path.display().to_string(),
        &config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string()),
    );

    let evaluator = Evaluator::new(worst);
    let report = evaluator.evaluate(&engine, &examples)?;
    reporter.print_summary(&report);
    reporter.print_worst_cases(&report);

    if args.baseline {
        let baseline = LinearBaseline::new(
            engine_config.coefficients,
            *engine.classifier().bounds(),
        );
        let baseline_report = evaluator.evaluate(&baseline, &examples)?;
        reporter.print_comparison(&report, &baseline_report);
    }

    if let Some(path) = args.json {
        reporter.export_json(&report, &path.to_string_lossy())?;
    }
    if let Some(path) = args.csv {
        reporter.export_csv(&report, &path.to_string_lossy())?;
    }

    Ok(())
}
