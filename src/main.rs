//! quarry - run SQL against the analytics query engine.

use quarry::cli::{Cli, OutputFormat};
use quarry::config::EngineConfig;
use quarry::error::{QuarryError, Result};
use quarry::logging;
use quarry::output;
use quarry::runner::Runner;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_stderr_logging();

    let cli = Cli::parse_args();

    if let Err(e) = run(&cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let format = cli.parse_output_format().map_err(QuarryError::config)?;
    let config = resolve_config(cli)?;
    info!("Engine: {}", config.display_string());

    let runner = Runner::new(config);
    let result = runner
        .run(cli.statements.clone(), cli.catalog.as_deref())
        .await?;

    match result {
        Some(table) => {
            let rendered = match format {
                OutputFormat::Text => output::render_text(&table),
                OutputFormat::Json => output::render_json(&table),
            };
            print!("{rendered}");
        }
        None => {
            // The last statement was DDL/DML; there is nothing to print.
            eprintln!("OK (no result set)");
        }
    }

    Ok(())
}

/// Resolves the engine configuration with precedence:
/// CLI arguments > config file > environment defaults.
fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let config_path = cli.config_path();
    let mut config = EngineConfig::load_from_file(&config_path)?;

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(user) = &cli.user {
        config.user = Some(user.clone());
    }
    if let Some(source) = &cli.source {
        config.source = Some(source.clone());
    }

    config.apply_env_defaults();
    Ok(config)
}
