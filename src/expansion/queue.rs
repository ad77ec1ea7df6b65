//! Bounded background queue for lexicon expansion.
//!
//! Scoring calls hand their matched phrases to [`ExpansionQueue::submit`],
//! which never blocks: when the queue is full the job is dropped with a
//! warning. A fixed set of named worker threads drains the queue, and a
//! failing or panicking job is logged without taking its worker down.
//! Shutting the queue down closes it and waits for queued jobs to finish.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::error::{LexRiskError, Result};
use crate::expansion::expander::LexiconExpander;

/// Sizing of the expansion queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Jobs that may wait before new submissions are dropped.
    pub capacity: usize,
    /// Worker threads draining the queue.
    pub workers: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            capacity: 32,
            workers: 1,
        }
    }
}

impl QueueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(LexRiskError::invalid_config("queue.capacity must be positive"));
        }
        if self.workers == 0 {
            return Err(LexRiskError::invalid_config("queue.workers must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct ExpansionJob {
    seeds: Vec<String>,
}

/// Fire-and-forget expansion jobs processed by background workers.
#[derive(Debug)]
pub struct ExpansionQueue {
    sender: Option<Sender<ExpansionJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl ExpansionQueue {
    /// Spawn the workers and open the queue.
    pub fn start(expander: Arc<LexiconExpander>, config: &QueueConfig) -> Result<Self> {
        config.validate()?;
        let (sender, receiver) = crossbeam_channel::bounded(config.capacity);

        let mut workers = Vec::with_capacity(config.workers);
        for i in 0..config.workers {
            let receiver = receiver.clone();
            let expander = Arc::clone(&expander);
            let handle = std::thread::Builder::new()
                .name(format!("lexrisk-expander-{i}"))
                .spawn(move || run_worker(expander, receiver))?;
            workers.push(handle);
        }

        log::debug!(
            "expansion queue started (capacity {}, workers {})",
            config.capacity,
            config.workers
        );
        Ok(ExpansionQueue {
            sender: Some(sender),
            workers,
        })
    }

    /// Queue an expansion of `seeds`. Returns whether the job was accepted.
    pub fn submit(&self, seeds: Vec<String>) -> bool {
        if seeds.is_empty() {
            return false;
        }
        let Some(sender) = &self.sender else {
            log::warn!("expansion queue is closed, dropping {} seeds", seeds.len());
            return false;
        };

        match sender.try_send(ExpansionJob { seeds }) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                log::warn!("expansion queue is full, dropping {} seeds", job.seeds.len());
                false
            }
            Err(TrySendError::Disconnected(job)) => {
                log::warn!(
                    "expansion workers are gone, dropping {} seeds",
                    job.seeds.len()
                );
                false
            }
        }
    }

    /// Jobs waiting to be picked up by a worker.
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, |sender| sender.len())
    }

    /// Stop accepting jobs, finish the queued ones and join the workers.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        // Dropping the last sender ends each worker's receive loop once drained.
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("expansion worker terminated abnormally");
            }
        }
    }
}

impl Drop for ExpansionQueue {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(expander: Arc<LexiconExpander>, receiver: Receiver<ExpansionJob>) {
    for job in receiver.iter() {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| expander.expand(&job.seeds)));
        match outcome {
            Ok(Ok(added)) => log::debug!("expansion job added {added} entries"),
            Ok(Err(err)) => log::warn!("lexicon expansion failed: {err}"),
            Err(_) => log::error!("lexicon expansion panicked, job dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::time::Duration;

    use super::*;
    use crate::analysis::dictionary::DictionaryLemmatizer;
    use crate::embedding::lookup::{EmbeddingLookup, Neighbor};
    use crate::embedding::table::WordVectorTable;
    use crate::expansion::expander::ExpansionConfig;
    use crate::lexicon::snapshot::SharedLexicon;
    use crate::lexicon::store::{LexiconStore, MemoryLexiconStore};

    fn expander_with(
        store: Arc<MemoryLexiconStore>,
        embeddings: Arc<dyn EmbeddingLookup>,
    ) -> Arc<LexiconExpander> {
        let lexicon =
            Arc::new(SharedLexicon::load(store, Arc::new(DictionaryLemmatizer::new())).unwrap());
        Arc::new(LexiconExpander::new(lexicon, embeddings, ExpansionConfig::default()).unwrap())
    }

    fn vectors() -> Arc<dyn EmbeddingLookup> {
        Arc::new(
            WordVectorTable::from_entries([
                ("cash".to_string(), vec![1.0, 0.0]),
                ("money".to_string(), vec![0.9, 0.1]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_shutdown_drains_queued_jobs() {
        let store = Arc::new(MemoryLexiconStore::new());
        let queue =
            ExpansionQueue::start(expander_with(store.clone(), vectors()), &QueueConfig::default())
                .unwrap();

        assert!(queue.submit(vec!["cash".to_string()]));
        assert!(!queue.submit(Vec::new()));
        queue.shutdown();

        let rows = store.load_rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].phrase, "money");
    }

    /// Blocks inside the first lookup until released.
    #[derive(Debug)]
    struct GatedLookup {
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl EmbeddingLookup for GatedLookup {
        fn nearest_neighbors(
            &self,
            token: &str,
            _topn: usize,
            _threshold: f32,
        ) -> Result<Vec<Neighbor>> {
            Err(LexRiskError::EmbeddingMiss(token.to_string()))
        }

        fn has_vector(&self, _token: &str) -> bool {
            let _ = self.entered.send(());
            let _ = self.release.recv();
            false
        }

        fn dimension(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "gated"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_submit_drops_when_full() {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let lookup = Arc::new(GatedLookup {
            entered: entered_tx,
            release: release_rx,
        });
        let config = QueueConfig {
            capacity: 1,
            workers: 1,
        };
        let queue =
            ExpansionQueue::start(expander_with(Arc::new(MemoryLexiconStore::new()), lookup), &config)
                .unwrap();

        assert!(queue.submit(vec!["a".to_string()]));
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        // The worker is busy with the first job; one more fits, the next does not.
        assert!(queue.submit(vec!["b".to_string()]));
        assert_eq!(queue.pending(), 1);
        assert!(!queue.submit(vec!["c".to_string()]));

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        queue.shutdown();
    }

    #[derive(Debug)]
    struct PanickingLookup;

    impl EmbeddingLookup for PanickingLookup {
        fn nearest_neighbors(
            &self,
            _token: &str,
            _topn: usize,
            _threshold: f32,
        ) -> Result<Vec<Neighbor>> {
            Ok(Vec::new())
        }

        fn has_vector(&self, token: &str) -> bool {
            if token == "boom" {
                panic!("lookup exploded");
            }
            false
        }

        fn dimension(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "panicking"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_worker_survives_panicking_job() {
        let store = Arc::new(MemoryLexiconStore::new());
        let queue = ExpansionQueue::start(
            expander_with(store, Arc::new(PanickingLookup)),
            &QueueConfig::default(),
        )
        .unwrap();

        assert!(queue.submit(vec!["boom".to_string()]));
        assert!(queue.submit(vec!["fine".to_string()]));
        queue.shutdown();
    }

    #[test]
    fn test_invalid_config() {
        let config = QueueConfig {
            capacity: 0,
            workers: 1,
        };
        let store = Arc::new(MemoryLexiconStore::new());
        assert!(ExpansionQueue::start(expander_with(store, vectors()), &config).is_err());
    }
}
