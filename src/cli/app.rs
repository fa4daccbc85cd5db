use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::dispatch::dispatch;
use super::env::CliArgs;
use pagefactory::logging::init_logging;
use pagefactory::{load_config, LoadedConfig};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let LoadedConfig { mut config, path } = load_config(cli.config.as_ref()).await?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_logging(&config.logging, cli.debug)?;

    info!(
        config = %path.display(),
        "Starting pagefactory v{}",
        env!("CARGO_PKG_VERSION")
    );

    match dispatch(&cli, config).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
