use clap::Parser;
use reimburse::application::calibration::fit_base_coefficients;
use reimburse::config::Config;
use reimburse::infrastructure::{EngineConfigPersistence, load_engine_config, load_reference_set};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Least-squares fit of the base formula coefficients", long_about = None)]
struct Args {
    /// Reference dataset (defaults to REIMBURSE_REFERENCE_DATA)
    #[arg(long)]
    cases: Option<PathBuf>,

    /// Engine configuration to start from (defaults to REIMBURSE_ENGINE_CONFIG, then built-ins)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the configuration with the fitted coefficients to this TOML file
    #[arg(short, long)]
    output: Option<PathBuf>,
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

    let examples = load_reference_set(&cases_path)?;
    let fit = fit_base_coefficients(&examples)?;

    println!("🔧 Fitted base formula on {} cases:", fit.samples);
    println!("  days:       {:.6}", fit.coefficients.days);
    println!("  miles:      {:.6}", fit.coefficients.miles);
    println!("  receipts:   {:.6}", fit.coefficients.receipts);
    println!("  intercept:  {:.6}", fit.coefficients.intercept);
    println!("  MAE:        ${:.2}", fit.mae);
    println!("  R²:         {:.4}", fit.r_squared);

    if let Some(output) = args.output {
        let updated =
            load_engine_config(config_path.as_deref())?.with_coefficients(fit.coefficients);
        EngineConfigPersistence::new(&output).save(&updated)?;
        println!("💾 Config saved to: {}", output.display());
    }

    Ok(())
}
