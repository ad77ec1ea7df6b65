//! Immutable lexicon snapshots and the shared holder that swaps them.
//!
//! Every scoring call takes one [`LexiconSnapshot`] from a [`SharedLexicon`]
//! and uses it for the whole call. Writers append to the store and then call
//! [`SharedLexicon::reload`], which builds a fresh snapshot and swaps it in;
//! calls already holding the old snapshot finish with it.

use std::sync::Arc;
use std::time::Instant;

use ahash::AHashSet;
use parking_lot::RwLock;

use crate::analysis::lemmatizer::Lemmatizer;
use crate::error::{LexRiskError, Result};
use crate::lexicon::entry::{LexiconEntry, LexiconRow};
use crate::lexicon::store::LexiconStore;

/// A consistent, lemmatized view of the lexicon.
#[derive(Debug, Default)]
pub struct LexiconSnapshot {
    entries: Vec<LexiconEntry>,
    phrases: AHashSet<String>,
}

impl LexiconSnapshot {
    /// Lemmatize each row's phrase once and build a snapshot.
    pub fn from_rows(rows: Vec<LexiconRow>, lemmatizer: &dyn Lemmatizer) -> Result<Self> {
        let mut entries = Vec::with_capacity(rows.len());
        let mut phrases = AHashSet::with_capacity(rows.len());

        for row in rows {
            let lemmas = lemmatizer.phrase_lemmas(&row.phrase).map_err(|err| {
                LexRiskError::lexicon_load(format!(
                    "cannot lemmatize phrase '{}': {err}",
                    row.phrase
                ))
            })?;
            if lemmas.is_empty() {
                log::warn!("lexicon phrase '{}' has no lemmas and will never match", row.phrase);
            }
            phrases.insert(row.phrase.trim().to_string());
            entries.push(LexiconEntry::new(row, lemmas));
        }

        Ok(LexiconSnapshot { entries, phrases })
    }

    /// Load every row from `store` and lemmatize it.
    pub fn load(store: &dyn LexiconStore, lemmatizer: &dyn Lemmatizer) -> Result<Self> {
        let rows = store.load_rows().map_err(into_load_error)?;
        Self::from_rows(rows, lemmatizer)
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry with exactly this surface phrase exists.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.phrases.contains(phrase.trim())
    }
}

fn into_load_error(err: LexRiskError) -> LexRiskError {
    match err {
        err @ LexRiskError::LexiconLoad(_) => err,
        other => LexRiskError::lexicon_load(other.to_string()),
    }
}

/// The current lexicon snapshot, shared between scoring calls and writers.
#[derive(Debug)]
pub struct SharedLexicon {
    store: Arc<dyn LexiconStore>,
    lemmatizer: Arc<dyn Lemmatizer>,
    current: RwLock<Arc<LexiconSnapshot>>,
    loaded_at: RwLock<Instant>,
}

impl SharedLexicon {
    /// Load the initial snapshot from `store`.
    pub fn load(store: Arc<dyn LexiconStore>, lemmatizer: Arc<dyn Lemmatizer>) -> Result<Self> {
        let snapshot = LexiconSnapshot::load(store.as_ref(), lemmatizer.as_ref())?;
        log::info!(
            "loaded {} lexicon entries from {}",
            snapshot.len(),
            store.location()
        );
        Ok(SharedLexicon {
            store,
            lemmatizer,
            current: RwLock::new(Arc::new(snapshot)),
            loaded_at: RwLock::new(Instant::now()),
        })
    }

    /// The current snapshot. Cheap; holds no lock after returning.
    pub fn snapshot(&self) -> Arc<LexiconSnapshot> {
        self.current.read().clone()
    }

    /// Re-read the store and swap in a fresh snapshot.
    ///
    /// On failure the previous snapshot stays current.
    pub fn reload(&self) -> Result<Arc<LexiconSnapshot>> {
        let snapshot = Arc::new(LexiconSnapshot::load(
            self.store.as_ref(),
            self.lemmatizer.as_ref(),
        )?);
        *self.current.write() = snapshot.clone();
        *self.loaded_at.write() = Instant::now();
        log::debug!(
            "reloaded {} lexicon entries from {}",
            snapshot.len(),
            self.store.location()
        );
        Ok(snapshot)
    }

    /// Append rows to the underlying store without reloading.
    pub fn append(&self, rows: &[LexiconRow]) -> Result<()> {
        self.store.append(rows)
    }

    /// When the current snapshot was loaded.
    pub fn loaded_at(&self) -> Instant {
        *self.loaded_at.read()
    }

    pub fn lemmatizer(&self) -> &Arc<dyn Lemmatizer> {
        &self.lemmatizer
    }

    pub fn store(&self) -> &Arc<dyn LexiconStore> {
        &self.store
    }
}
