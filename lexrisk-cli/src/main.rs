mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::{expand, lexicon, score};

fn main() -> Result<()> {
    // Library `log` records are bridged into this subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LEXRISK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;
    let config = context::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Init => {
            context::init_lexicon(&config)?;
            println!("Lexicon ready at {}.", config.lexicon.display());
            Ok(())
        }
        Command::Score(cmd) => score::run(cmd, &config, format),
        Command::Expand(cmd) => expand::run(cmd, &config, format),
        Command::Lexicon(cmd) => lexicon::run(cmd, &config, format),
    }
}
