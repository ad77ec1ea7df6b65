use anyhow::{Context, Result};
use lexrisk::{LexiconRow, LexiconStore};

use crate::cli::{LexiconAction, LexiconCommand};
use crate::context::{self, CliConfig};
use crate::output::{self, OutputFormat};

/// Execute a lexicon command.
pub fn run(cmd: LexiconCommand, config: &CliConfig, format: OutputFormat) -> Result<()> {
    match cmd.action {
        LexiconAction::List => {
            let store = context::open_store(config)?;
            let rows = store.load_rows().context("Failed to read the lexicon")?;
            output::print_rows(&rows, format)
        }
        LexiconAction::Add {
            phrase,
            category,
            score,
        } => {
            let engine = context::open_engine(config)?;
            let added = engine
                .add_entries(vec![LexiconRow::new(score, phrase, category)])
                .context("Failed to add the lexicon entry")?;
            output::print_added(added, format)?;
            engine.shutdown();
            Ok(())
        }
    }
}
