use serde::{Deserialize, Serialize};

/// Category given to entries whose curator did not choose one.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Column order of the persisted lexicon. Fixed; never auto-detected.
pub const LEXICON_HEADER: [&str; 3] = ["score", "phrase", "category"];

/// One persisted lexicon row, in canonical column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LexiconRow {
    /// Weight added to the raw score when the phrase matches.
    pub score: u32,
    /// Phrase text; may hold several words.
    pub phrase: String,
    /// Freeform category label.
    pub category: String,
}

impl LexiconRow {
    pub fn new(score: u32, phrase: impl Into<String>, category: impl Into<String>) -> Self {
        LexiconRow {
            score,
            phrase: phrase.into(),
            category: category.into(),
        }
    }
}

/// A lexicon row with its phrase lemmatized, ready for matching.
///
/// Entries are built once per lexicon load and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub phrase: String,
    /// Lemmas of the whole phrase, in phrase order.
    pub lemmas: Vec<String>,
    pub score: u32,
    pub category: String,
}

impl LexiconEntry {
    pub fn new(row: LexiconRow, lemmas: Vec<String>) -> Self {
        LexiconEntry {
            phrase: row.phrase,
            lemmas,
            score: row.score,
            category: row.category,
        }
    }

    /// An entry without lemmas must never match: containment of the empty set
    /// would be vacuously true for every sentence.
    pub fn is_matchable(&self) -> bool {
        !self.lemmas.is_empty()
    }
}
