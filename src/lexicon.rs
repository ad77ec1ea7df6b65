//! The phrase lexicon: the ground truth every scoring call matches against.
//!
//! # Module Structure
//!
//! - `entry`: persisted rows and their lemmatized in-memory form
//! - `store`: durable, append-only storage (`CsvLexiconStore`, `MemoryLexiconStore`)
//! - `snapshot`: immutable snapshots and the shared holder that swaps them on reload

pub mod entry;
pub mod snapshot;
pub mod store;

// Re-exports
pub use entry::{LEXICON_HEADER, LexiconEntry, LexiconRow, UNKNOWN_CATEGORY};
pub use snapshot::{LexiconSnapshot, SharedLexicon};
pub use store::{CsvLexiconStore, LexiconStore, MemoryLexiconStore};
