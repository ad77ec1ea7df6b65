use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// LexRisk - lexical risk scoring CLI
#[derive(Parser)]
#[command(name = "lexrisk", version, about)]
pub struct Cli {
    /// Path to the configuration TOML file.
    #[arg(long, env = "LEXRISK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty lexicon file.
    Init,
    /// Score a text against the lexicon.
    Score(ScoreCommand),
    /// Expand the lexicon from seed phrases.
    Expand(ExpandCommand),
    /// Inspect or curate the lexicon.
    Lexicon(LexiconCommand),
}

// --- Score ---

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct TextSource {
    /// Text to score.
    #[arg(long)]
    pub text: Option<String>,

    /// File whose contents are scored.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ScoreCommand {
    #[command(flatten)]
    pub source: TextSource,

    /// Expand the lexicon from the matched phrases before exiting.
    #[arg(long)]
    pub expand: bool,
}

// --- Expand ---

#[derive(Parser)]
pub struct ExpandCommand {
    /// Seed phrase; may be repeated.
    #[arg(long = "phrase", required = true)]
    pub phrases: Vec<String>,
}

// --- Lexicon ---

#[derive(Parser)]
pub struct LexiconCommand {
    #[command(subcommand)]
    pub action: LexiconAction,
}

#[derive(Subcommand)]
pub enum LexiconAction {
    /// List every lexicon entry.
    List,
    /// Add an entry to the lexicon.
    Add {
        /// Surface phrase.
        #[arg(long)]
        phrase: String,
        /// Category label.
        #[arg(long)]
        category: String,
        /// Raw score contributed by each match.
        #[arg(long)]
        score: u32,
    },
}
