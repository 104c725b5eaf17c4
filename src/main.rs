use clap::Parser;
use dotenv::dotenv;
use pairpioneer::cli::{Cli, Commands};
use pairpioneer::commands::{run_discover, run_evaluate, run_signals};
use pairpioneer::config::PairsConfig;
use pairpioneer::observability::init_tracing;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from the .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.verbose);

    let base = match &cli.config {
        Some(path) => PairsConfig::load(path)?,
        None => PairsConfig::default(),
    }
    .with_env();

    let result = match &cli.command {
        Commands::Evaluate { x, y, analysis } => {
            let config = analysis.apply(base)?;
            run_evaluate(&config, x, y)
        }
        Commands::Signals {
            x,
            y,
            beta,
            close,
            output,
            analysis,
            paper,
        } => {
            let config = analysis.apply(base)?;
            run_signals(&config, x, y, *beta, *close, output.as_deref(), paper).await
        }
        Commands::Discover {
            symbols,
            output,
            analysis,
        } => {
            let config = analysis.apply(base)?;
            run_discover(&config, symbols, output.as_deref())
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}
