//! # LexRisk
//!
//! Lexical risk scoring for transcribed speech and free text.
//!
//! ## Features
//!
//! - Sentence-scoped, lemma-based phrase matching (order-insensitive containment)
//! - Saturating score normalization onto `0..=98`
//! - A phrase lexicon persisted as append-only CSV
//! - Self-expanding lexicon driven by word-embedding neighbors, run on a
//!   bounded background queue
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lexrisk::{CsvLexiconStore, DictionaryLemmatizer, EngineConfig, RiskEngine};
//!
//! # fn main() -> lexrisk::Result<()> {
//! let engine = RiskEngine::builder()
//!     .config(EngineConfig::default())
//!     .lemmatizer(Arc::new(DictionaryLemmatizer::new()))
//!     .store(Arc::new(CsvLexiconStore::create("suspicious_words.csv")?))
//!     .build()?;
//!
//! let assessment = engine.score("transfer the cash abroad")?;
//! engine.expand_lexicon_async(assessment.matched_phrases.clone());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod embedding;
pub mod engine;
mod error;
pub mod expansion;
pub mod lexicon;
pub mod scoring;
mod util;

// Re-exports for the public API
pub use analysis::dictionary::DictionaryLemmatizer;
pub use analysis::lemmatizer::{Lemmatizer, Sentence, Word};
pub use embedding::lookup::{EmbeddingLookup, Neighbor};
pub use embedding::table::WordVectorTable;
pub use engine::config::{EngineConfig, ReloadPolicy, ScoringConfig};
pub use engine::{RiskEngine, RiskEngineBuilder};
pub use error::{LexRiskError, Result};
pub use expansion::expander::{ExpansionConfig, LexiconExpander};
pub use expansion::queue::{ExpansionQueue, QueueConfig};
pub use lexicon::entry::{LexiconEntry, LexiconRow};
pub use lexicon::snapshot::{LexiconSnapshot, SharedLexicon};
pub use lexicon::store::{CsvLexiconStore, LexiconStore, MemoryLexiconStore};
pub use scoring::assessment::{RiskAssessment, Severity};
pub use scoring::matcher::{MatchResult, PhraseMatcher};
pub use scoring::normalize::{ScoreNormalizer, normalize_score};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
