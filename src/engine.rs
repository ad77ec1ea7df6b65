//! The risk engine facade.
//!
//! [`RiskEngine`] wires a [`SharedLexicon`], a [`PhraseMatcher`], a
//! [`ScoreNormalizer`] and a background [`ExpansionQueue`] together. Scoring
//! calls run on a dedicated rayon pool and are bounded by
//! `scoring.timeout_ms`; expansion always runs off the scoring path.

pub mod config;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;

use crate::analysis::lemmatizer::Lemmatizer;
use crate::embedding::lookup::EmbeddingLookup;
use crate::embedding::table::WordVectorTable;
use crate::error::{LexRiskError, Result};
use crate::expansion::expander::LexiconExpander;
use crate::expansion::queue::ExpansionQueue;
use crate::lexicon::entry::LexiconRow;
use crate::lexicon::snapshot::{LexiconSnapshot, SharedLexicon};
use crate::lexicon::store::LexiconStore;
use crate::scoring::assessment::RiskAssessment;
use crate::scoring::matcher::PhraseMatcher;
use crate::scoring::normalize::ScoreNormalizer;

use self::config::{EngineConfig, ReloadPolicy};

/// State shared between the engine handle and its scoring tasks.
#[derive(Debug)]
struct EngineInner {
    lexicon: Arc<SharedLexicon>,
    matcher: PhraseMatcher,
    normalizer: ScoreNormalizer,
    reload: ReloadPolicy,
    expander: Arc<LexiconExpander>,
}

impl EngineInner {
    /// Returns `None` when `cancel` was set before the match finished.
    fn assess(&self, text: &str, cancel: &AtomicBool) -> Option<Result<RiskAssessment>> {
        if cancel.load(Ordering::Acquire) {
            return None;
        }
        let snapshot = match self.current_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => return Some(Err(err)),
        };
        let result = self.matcher.match_text_cancellable(text, &snapshot, cancel)?;
        Some(Ok(RiskAssessment::from_match(result, &self.normalizer)))
    }

    fn current_snapshot(&self) -> Result<Arc<LexiconSnapshot>> {
        match self.reload {
            ReloadPolicy::OnWrite => Ok(self.lexicon.snapshot()),
            ReloadPolicy::PerRequest => self.lexicon.reload(),
            ReloadPolicy::Interval { secs } => {
                if self.lexicon.loaded_at().elapsed() >= Duration::from_secs(secs) {
                    self.lexicon.reload()
                } else {
                    Ok(self.lexicon.snapshot())
                }
            }
        }
    }
}

/// Scores texts against a phrase lexicon and grows the lexicon in the
/// background.
#[derive(Debug)]
pub struct RiskEngine {
    inner: Arc<EngineInner>,
    pool: rayon::ThreadPool,
    queue: ExpansionQueue,
    timeout: Duration,
}

impl RiskEngine {
    pub fn builder() -> RiskEngineBuilder {
        RiskEngineBuilder::default()
    }

    /// Score `text` against the current lexicon.
    ///
    /// Empty or whitespace-only text returns an empty assessment without
    /// reading the lexicon. Fails with [`LexRiskError::LexiconLoad`] when a
    /// reload required by the reload policy fails, and with
    /// [`LexRiskError::Timeout`] when the call exceeds its budget. A timed-out
    /// call is cancelled: if its task has not started yet it never runs, and
    /// a running one stops at the next sentence boundary.
    pub fn score(&self, text: &str) -> Result<RiskAssessment> {
        if text.trim().is_empty() {
            return Ok(RiskAssessment::empty());
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let inner = Arc::clone(&self.inner);
        let task_cancel = Arc::clone(&cancel);
        let text = text.to_string();
        self.pool.spawn(move || match inner.assess(&text, &task_cancel) {
            Some(result) => {
                let _ = tx.send(result);
            }
            None => log::debug!("dropped cancelled scoring task"),
        });

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                cancel.store(true, Ordering::Release);
                log::warn!("scoring call exceeded {:?}", self.timeout);
                Err(LexRiskError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(LexRiskError::internal(
                "scoring task ended without a result",
            )),
        }
    }

    /// Queue a background expansion seeded with `phrases`.
    ///
    /// Never blocks; returns whether the job was accepted.
    pub fn expand_lexicon_async(&self, phrases: Vec<String>) -> bool {
        self.queue.submit(phrases)
    }

    /// Score `text`, then queue an expansion seeded with its matched phrases.
    pub fn score_and_expand(&self, text: &str) -> Result<RiskAssessment> {
        let assessment = self.score(text)?;
        if !assessment.matched_phrases.is_empty() {
            self.expand_lexicon_async(assessment.matched_phrases.clone());
        }
        Ok(assessment)
    }

    /// Expand the lexicon on the calling thread and return how many entries
    /// were added.
    pub fn expand_lexicon(&self, phrases: &[String]) -> Result<usize> {
        self.inner.expander.expand(phrases)
    }

    /// Append curated rows, skipping phrases the lexicon already has, and
    /// refresh the snapshot. Returns how many rows were added.
    pub fn add_entries(&self, rows: Vec<LexiconRow>) -> Result<usize> {
        self.inner.expander.add_rows(rows)
    }

    /// The lexicon snapshot scoring calls currently use.
    pub fn lexicon(&self) -> Arc<LexiconSnapshot> {
        self.inner.lexicon.snapshot()
    }

    /// Re-read the store now, regardless of the reload policy.
    pub fn reload_lexicon(&self) -> Result<Arc<LexiconSnapshot>> {
        self.inner.lexicon.reload()
    }

    /// Expansion jobs waiting in the queue.
    pub fn pending_expansions(&self) -> usize {
        self.queue.pending()
    }

    /// Stop accepting expansion jobs and wait for the queued ones.
    pub fn shutdown(self) {
        log::debug!("shutting down risk engine");
        self.queue.shutdown();
    }
}

/// Builder for [`RiskEngine`].
///
/// A lemmatizer and a lexicon store are required. Without embeddings every
/// expansion is a no-op.
#[derive(Debug, Default)]
pub struct RiskEngineBuilder {
    config: EngineConfig,
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
    embeddings: Option<Arc<dyn EmbeddingLookup>>,
    store: Option<Arc<dyn LexiconStore>>,
}

impl RiskEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lemmatizer(mut self, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        self.lemmatizer = Some(lemmatizer);
        self
    }

    pub fn embeddings(mut self, embeddings: Arc<dyn EmbeddingLookup>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    pub fn store(mut self, store: Arc<dyn LexiconStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate the configuration, load the lexicon and start the workers.
    pub fn build(self) -> Result<RiskEngine> {
        let config = self.config;
        config.validate()?;

        let lemmatizer = self
            .lemmatizer
            .ok_or_else(|| LexRiskError::invalid_config("a lemmatizer is required"))?;
        let store = self
            .store
            .ok_or_else(|| LexRiskError::invalid_config("a lexicon store is required"))?;
        let embeddings = self
            .embeddings
            .unwrap_or_else(|| Arc::new(WordVectorTable::empty()));

        let lexicon = Arc::new(SharedLexicon::load(store, Arc::clone(&lemmatizer))?);
        let expander = Arc::new(LexiconExpander::new(
            Arc::clone(&lexicon),
            embeddings,
            config.expansion.clone(),
        )?);
        let queue = ExpansionQueue::start(Arc::clone(&expander), &config.queue)?;

        let threads = config.scoring.threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("lexrisk-scorer-{i}"))
            .panic_handler(|_| log::error!("scoring task panicked"))
            .build()
            .map_err(|err| {
                LexRiskError::internal(format!("failed to build scoring pool: {err}"))
            })?;

        log::info!(
            "risk engine ready ({} lexicon entries, {} scoring threads, reload {:?})",
            lexicon.snapshot().len(),
            threads,
            config.reload
        );

        Ok(RiskEngine {
            inner: Arc::new(EngineInner {
                lexicon,
                matcher: PhraseMatcher::new(lemmatizer),
                normalizer: config.scoring.normalizer()?,
                reload: config.reload,
                expander,
            }),
            pool,
            queue,
            timeout: config.scoring.timeout(),
        })
    }
}
