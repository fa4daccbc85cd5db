use anyhow::Result;

use super::commands::Commands;
use super::env::CliArgs;
use super::expand::cmd_expand;
use super::index::cmd_index;
use super::run::cmd_run;
use pagefactory::PageFactoryConfig;

pub async fn dispatch(cli: &CliArgs, config: PageFactoryConfig) -> Result<()> {
    match cli.command.clone() {
        Commands::Index(args) => cmd_index(args, config, cli.output),
        Commands::Expand(args) => cmd_expand(args, config, cli.output),
        Commands::Run(args) => cmd_run(args, config, cli.output).await,
    }
}
