use anyhow::{Context, Result};

use crate::cli::ExpandCommand;
use crate::context::{self, CliConfig};
use crate::output::{self, OutputFormat};

/// Execute an expand command.
pub fn run(cmd: ExpandCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    if config.vectors.is_none() {
        tracing::warn!("no word vectors configured; expansion cannot add entries");
    }
    let engine = context::open_engine(config)?;
    let added = engine
        .expand_lexicon(&cmd.phrases)
        .context("Lexicon expansion failed")?;
    output::print_added(added, format)?;
    engine.shutdown();
    Ok(())
}
