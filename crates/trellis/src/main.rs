mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    trellis_runtime::init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        // Writes the config, so it must not require one
        Commands::Init { path } => commands::init::run_init(&path),
        Commands::Run {
            function,
            set,
            json,
        } => {
            let config = config::load_config(config_path)?;
            commands::run::execute(function, set, json, &config).await
        }
        Commands::Filters => commands::filters::execute(&config::load_config(config_path)?),
    }
}
