use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lexrisk::{CsvLexiconStore, DictionaryLemmatizer, EngineConfig, RiskEngine, WordVectorTable};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "lexrisk.toml";
const DEFAULT_LEXICON_FILE: &str = "suspicious_words.csv";

/// Contents of `lexrisk.toml`.
///
/// Relative paths are resolved against the directory of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Lexicon CSV file.
    pub lexicon: PathBuf,
    /// Optional `surface<TAB>lemma` dictionary.
    pub lemma_dictionary: Option<PathBuf>,
    /// Optional word2vec text file used for expansion.
    pub vectors: Option<PathBuf>,
    /// Single-character prefixes split off unknown words, e.g. "בוהלמשכ".
    pub clitic_prefixes: String,
    pub engine: EngineConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            lexicon: PathBuf::from(DEFAULT_LEXICON_FILE),
            lemma_dictionary: None,
            vectors: None,
            clitic_prefixes: String::new(),
            engine: EngineConfig::default(),
        }
    }
}

impl CliConfig {
    fn resolve_paths(mut self, base: &Path) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        };
        self.lexicon = resolve(self.lexicon);
        self.lemma_dictionary = self.lemma_dictionary.map(resolve);
        self.vectors = self.vectors.map(resolve);
        self
    }
}

/// Load the configuration.
///
/// Without `--config`, `./lexrisk.toml` is used when present and the defaults
/// otherwise.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {} does not exist.", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                return Ok(CliConfig::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
    let config = parse_config(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::debug!("loaded config from {}", path.display());
    Ok(config.resolve_paths(base))
}

fn parse_config(content: &str) -> Result<CliConfig> {
    let config: CliConfig = toml::from_str(content).context("Failed to parse config TOML")?;
    config
        .engine
        .validate()
        .context("Invalid [engine] configuration")?;
    Ok(config)
}

/// Create the lexicon file if it does not exist yet.
pub fn init_lexicon(config: &CliConfig) -> Result<()> {
    CsvLexiconStore::create(&config.lexicon).with_context(|| {
        format!("Failed to create lexicon at {}", config.lexicon.display())
    })?;
    Ok(())
}

/// Open an existing lexicon store.
pub fn open_store(config: &CliConfig) -> Result<CsvLexiconStore> {
    if !config.lexicon.exists() {
        bail!(
            "No lexicon found at {}. Run 'lexrisk init' first.",
            config.lexicon.display()
        );
    }
    Ok(CsvLexiconStore::open(&config.lexicon)?)
}

/// Build an engine over the configured lexicon and adapters.
pub fn open_engine(config: &CliConfig) -> Result<RiskEngine> {
    let store = open_store(config)?;

    let lemmatizer = match &config.lemma_dictionary {
        Some(path) => DictionaryLemmatizer::from_tsv_path(path)
            .with_context(|| format!("Failed to load lemma dictionary {}", path.display()))?,
        None => DictionaryLemmatizer::new(),
    }
    .with_clitic_prefixes(config.clitic_prefixes.chars());

    let embeddings = match &config.vectors {
        Some(path) => WordVectorTable::from_text_path(path)
            .with_context(|| format!("Failed to load word vectors {}", path.display()))?,
        None => WordVectorTable::empty(),
    };

    let engine = RiskEngine::builder()
        .config(config.engine.clone())
        .lemmatizer(Arc::new(lemmatizer))
        .embeddings(Arc::new(embeddings))
        .store(Arc::new(store))
        .build()
        .context("Failed to start the risk engine")?;
    Ok(engine)
}
