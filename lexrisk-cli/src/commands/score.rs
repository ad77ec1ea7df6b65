use anyhow::{Context, Result};

use crate::cli::ScoreCommand;
use crate::context::{self, CliConfig};
use crate::output::{self, OutputFormat};

/// Execute a score command.
pub fn run(cmd: ScoreCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let text = match (cmd.source.text, cmd.source.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --text or --file is required."),
    };

    let engine = context::open_engine(config)?;
    let assessment = if cmd.expand {
        engine.score_and_expand(&text)?
    } else {
        engine.score(&text)?
    };
    output::print_assessment(&assessment, format)?;

    if cmd.expand {
        tracing::info!(
            "waiting for {} queued expansion jobs",
            engine.pending_expansions()
        );
    }
    // Drains queued expansions before the process exits.
    engine.shutdown();
    Ok(())
}
