//! Text analysis for LexRisk.
//!
//! Splits text into sentences and gives each word a lemma, the dictionary
//! form the lexicon is matched against.
//!
//! ```text
//! Text → Sentences → (surface, lemma) words
//! ```
//!
//! # Modules
//!
//! - [`lemmatizer`]: the [`Lemmatizer`](lemmatizer::Lemmatizer) adapter trait and its output types
//! - [`dictionary`]: a lemmatizer backed by a pretrained surface→lemma table

pub mod dictionary;
pub mod lemmatizer;

pub use dictionary::DictionaryLemmatizer;
pub use lemmatizer::{Lemmatizer, Sentence, Word};
