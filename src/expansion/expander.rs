//! Lexicon growth from embedding neighbors of flagged phrases.
//!
//! For each seed phrase the expander asks the [`EmbeddingLookup`] for close
//! vocabulary tokens, turns them back into surface phrases, drops the ones the
//! lexicon already has, and appends the rest as low-confidence entries in a
//! single batch. The neighbor search runs without any lock; only the
//! dedup-append-reload step is serialized, so concurrent expansions never add
//! the same phrase twice. Phrases appended while the snapshot could not be
//! refreshed are remembered until a later refresh succeeds.

use std::sync::Arc;

use ahash::AHashSet;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::embedding::lookup::EmbeddingLookup;
use crate::embedding::vocab;
use crate::error::{LexRiskError, Result};
use crate::lexicon::entry::{LexiconRow, UNKNOWN_CATEGORY};
use crate::lexicon::snapshot::SharedLexicon;

/// Tuning for lexicon expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Neighbors requested per seed.
    pub topn: usize,
    /// Minimum cosine similarity of a neighbor, in `[0, 1]`.
    pub similarity_threshold: f32,
    /// Seeds considered per call; later seeds are ignored.
    pub max_seeds: usize,
    /// Score given to expanded entries.
    pub default_score: u32,
    /// Category given to expanded entries.
    pub default_category: String,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        ExpansionConfig {
            topn: 10,
            similarity_threshold: 0.6,
            max_seeds: 5,
            default_score: 5,
            default_category: UNKNOWN_CATEGORY.to_string(),
        }
    }
}

impl ExpansionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topn == 0 {
            return Err(LexRiskError::invalid_config("expansion.topn must be positive"));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(LexRiskError::invalid_config(format!(
                "expansion.similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.max_seeds == 0 {
            return Err(LexRiskError::invalid_config(
                "expansion.max_seeds must be positive",
            ));
        }
        if self.default_category.trim().is_empty() {
            return Err(LexRiskError::invalid_config(
                "expansion.default_category must not be empty",
            ));
        }
        Ok(())
    }
}

/// Grows a [`SharedLexicon`] from embedding neighbors.
#[derive(Debug)]
pub struct LexiconExpander {
    lexicon: Arc<SharedLexicon>,
    embeddings: Arc<dyn EmbeddingLookup>,
    config: ExpansionConfig,
    /// Serializes appends. Holds the phrases appended since the last
    /// successful reload.
    unseen: Mutex<AHashSet<String>>,
}

impl LexiconExpander {
    pub fn new(
        lexicon: Arc<SharedLexicon>,
        embeddings: Arc<dyn EmbeddingLookup>,
        config: ExpansionConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(LexiconExpander {
            lexicon,
            embeddings,
            config,
            unseen: Mutex::new(AHashSet::new()),
        })
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Expand the lexicon from `seed_phrases` and return how many entries
    /// were added.
    ///
    /// Lookup misses are skipped. A failed append is retried once and then
    /// reported as [`LexRiskError::ExpansionWrite`]. A failed refresh after a
    /// successful append is logged, and the appended phrases still count as
    /// known to later calls.
    pub fn expand(&self, seed_phrases: &[String]) -> Result<usize> {
        let candidates = self.candidates(seed_phrases);
        if candidates.is_empty() {
            return Ok(0);
        }

        let rows = candidates
            .into_iter()
            .map(|phrase| {
                LexiconRow::new(
                    self.config.default_score,
                    phrase,
                    self.config.default_category.clone(),
                )
            })
            .collect();
        let added = self.add_rows(rows)?;
        if added == 0 {
            log::debug!("expansion found no new phrases");
        }
        Ok(added)
    }

    /// Append the rows whose phrase is not in the lexicon yet and refresh the
    /// shared snapshot. Returns how many rows were appended.
    ///
    /// Serialized with expansion, so a phrase is never added twice.
    pub fn add_rows(&self, rows: Vec<LexiconRow>) -> Result<usize> {
        let mut unseen = self.unseen.lock();
        let snapshot = self.lexicon.snapshot();
        unseen.retain(|phrase| !snapshot.contains_phrase(phrase));

        let mut queued = AHashSet::new();
        let rows: Vec<LexiconRow> = rows
            .into_iter()
            .map(|row| LexiconRow::new(row.score, row.phrase.trim(), row.category.trim()))
            .filter(|row| !snapshot.contains_phrase(&row.phrase) && !unseen.contains(&row.phrase))
            .filter(|row| queued.insert(row.phrase.clone()))
            .collect();
        if rows.is_empty() {
            return Ok(0);
        }

        self.append_with_retry(&rows)?;
        match self.lexicon.reload() {
            Ok(_) => unseen.clear(),
            Err(err) => {
                log::warn!("lexicon refresh after append failed: {err}");
                unseen.extend(queued);
            }
        }

        log::info!(
            "added {} lexicon entries: {:?}",
            rows.len(),
            rows.iter().map(|r| r.phrase.as_str()).collect::<Vec<_>>()
        );
        Ok(rows.len())
    }

    /// Cleaned neighbor phrases of the first `max_seeds` distinct seeds.
    fn candidates(&self, seed_phrases: &[String]) -> Vec<String> {
        let mut seen = AHashSet::new();
        let seeds = seed_phrases
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(*s))
            .take(self.config.max_seeds);

        let mut candidates = Vec::new();
        for seed in seeds {
            let key = vocab::to_vocab_key(seed);
            if !self.embeddings.has_vector(&key) {
                log::debug!("no embedding for '{seed}', skipping");
                continue;
            }

            match self.embeddings.nearest_neighbors(
                &key,
                self.config.topn,
                self.config.similarity_threshold,
            ) {
                Ok(neighbors) => candidates.extend(
                    neighbors
                        .into_iter()
                        .map(|n| vocab::clean_token(&n.token))
                        .filter(|phrase| !phrase.is_empty() && phrase != seed),
                ),
                Err(LexRiskError::EmbeddingMiss(token)) => {
                    log::debug!("no embedding for '{token}', skipping");
                }
                Err(err) => {
                    log::warn!("neighbor lookup for '{seed}' failed: {err}");
                }
            }
        }
        candidates
    }

    fn append_with_retry(&self, rows: &[LexiconRow]) -> Result<()> {
        match self.lexicon.append(rows) {
            Ok(()) => Ok(()),
            // Rejected rows fail the same way every time.
            Err(err @ LexRiskError::InvalidArgument(_)) => Err(err),
            Err(first) => {
                log::warn!("lexicon append failed, retrying once: {first}");
                self.lexicon.append(rows).map_err(|err| {
                    LexRiskError::expansion_write(format!("{} rows dropped: {err}", rows.len()))
                })
            }
        }
    }
}
