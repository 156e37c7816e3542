mod cli;
mod logging;
mod run;
mod settings;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init();

    match &cli.command {
        Commands::Unify(args) => run::unify(args),
        Commands::Normalize(args) => run::normalize(args),
        Commands::CheckConfig(args) => run::check_config(args),
    }
}
