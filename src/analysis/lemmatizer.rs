//! Lemmatizer adapter trait and its output types.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single word of a sentence: the text as written and its lemma.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Surface form, exactly as it appears in the input.
    pub text: String,
    /// Normalized dictionary form.
    pub lemma: String,
}

impl Word {
    pub fn new(text: impl Into<String>, lemma: impl Into<String>) -> Self {
        Word {
            text: text.into(),
            lemma: lemma.into(),
        }
    }
}

/// An ordered sequence of words making up one sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub words: Vec<Word>,
}

impl Sentence {
    pub fn new(words: Vec<Word>) -> Self {
        Sentence { words }
    }

    /// Iterate over the lemmas of this sentence in order.
    pub fn lemmas(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.lemma.as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Splits text into sentences of (surface, lemma) words.
///
/// Implementations wrap a pretrained morphological analyzer. They must be
/// deterministic: the same text always yields the same sentences, which is
/// what makes scoring idempotent.
pub trait Lemmatizer: Send + Sync + std::fmt::Debug {
    /// Split `text` into sentences and lemmatize every word.
    ///
    /// Empty or whitespace-only text yields no sentences.
    fn lemmatize(&self, text: &str) -> Result<Vec<Sentence>>;

    /// Lemmas of a whole phrase, across all of its sentences, in order.
    fn phrase_lemmas(&self, phrase: &str) -> Result<Vec<String>> {
        Ok(self
            .lemmatize(phrase)?
            .into_iter()
            .flat_map(|sentence| sentence.words.into_iter().map(|w| w.lemma))
            .collect())
    }

    /// Name of this lemmatizer, for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct WhitespaceLemmatizer;

    impl Lemmatizer for WhitespaceLemmatizer {
        fn lemmatize(&self, text: &str) -> Result<Vec<Sentence>> {
            Ok(text
                .split('.')
                .map(|s| {
                    Sentence::new(
                        s.split_whitespace()
                            .map(|w| Word::new(w, w.to_lowercase()))
                            .collect(),
                    )
                })
                .filter(|s| !s.is_empty())
                .collect())
        }

        fn name(&self) -> &str {
            "whitespace"
        }
    }

    #[test]
    fn test_phrase_lemmas_flattens_sentences() {
        let lemmas = WhitespaceLemmatizer
            .phrase_lemmas("Cash Money. Offshore")
            .unwrap();
        assert_eq!(lemmas, vec!["cash", "money", "offshore"]);
    }

    #[test]
    fn test_sentence_lemmas() {
        let sentence = Sentence::new(vec![Word::new("Moved", "move"), Word::new("funds", "fund")]);
        assert_eq!(sentence.lemmas().collect::<Vec<_>>(), vec!["move", "fund"]);
        assert_eq!(sentence.len(), 2);
    }
}
