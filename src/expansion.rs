//! Self-expanding lexicon.
//!
//! - `expander`: finds embedding neighbors of matched phrases and appends the
//!   new ones to the lexicon
//! - `queue`: bounded, non-blocking background queue that runs the expander

pub mod expander;
pub mod queue;

pub use expander::{ExpansionConfig, LexiconExpander};
pub use queue::{ExpansionQueue, QueueConfig};
