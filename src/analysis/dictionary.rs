//! Dictionary-backed lemmatizer.
//!
//! [`DictionaryLemmatizer`] splits text with Unicode sentence and word
//! boundaries (UAX #29), normalizes every word to NFC lowercase, and maps it to
//! a lemma through a pretrained surface→lemma table. Words missing from the
//! table are their own lemma.
//!
//! Morphologically rich languages glue single-letter clitics onto the next
//! word (Hebrew ב, ו, ל, ...). When configured with
//! [`with_clitic_prefixes`](DictionaryLemmatizer::with_clitic_prefixes), an
//! unknown word whose remainder is a known surface form is split into the
//! one-character prefix and the remainder, mirroring multi-word token
//! expansion in full analyzers.
//!
//! ## File format
//!
//! Tab-separated, one `surface<TAB>lemma` pair per line, `#` starts a comment.
//! No quoting is applied, so `"` may appear inside Hebrew abbreviations.

use std::io::Read;
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::lemmatizer::{Lemmatizer, Sentence, Word};
use crate::error::{LexRiskError, Result};

/// Lemmatizer backed by a surface→lemma table.
#[derive(Debug, Clone, Default)]
pub struct DictionaryLemmatizer {
    lemmas: AHashMap<String, String>,
    clitic_prefixes: AHashSet<char>,
}

impl DictionaryLemmatizer {
    /// Create a lemmatizer with an empty table (every word is its own lemma).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a lemmatizer from `(surface, lemma)` pairs.
    pub fn with_entries<I, S, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, L)>,
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let mut lemmatizer = Self::new();
        for (surface, lemma) in entries {
            lemmatizer.insert(surface.as_ref(), lemma.as_ref());
        }
        lemmatizer
    }

    /// Load a lemma table from a TSV file.
    pub fn from_tsv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let lemmatizer = Self::from_tsv_reader(file)?;
        log::info!(
            "loaded {} lemma entries from {}",
            lemmatizer.len(),
            path.as_ref().display()
        );
        Ok(lemmatizer)
    }

    /// Load a lemma table from any TSV reader.
    pub fn from_tsv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .quoting(false)
            .from_reader(reader);

        let mut lemmatizer = Self::new();
        for record in csv_reader.records() {
            let record = record?;
            match (record.get(0), record.get(1)) {
                (Some(surface), Some(lemma)) if !surface.trim().is_empty() => {
                    lemmatizer.insert(surface.trim(), lemma.trim());
                }
                _ => {
                    let line = record.position().map(|p| p.line()).unwrap_or_default();
                    return Err(LexRiskError::invalid_argument(format!(
                        "lemma table line {line}: expected 'surface<TAB>lemma'"
                    )));
                }
            }
        }
        Ok(lemmatizer)
    }

    /// Split these single-character prefixes off unknown words.
    pub fn with_clitic_prefixes<I: IntoIterator<Item = char>>(mut self, prefixes: I) -> Self {
        self.clitic_prefixes = prefixes.into_iter().collect();
        self
    }

    /// Add or replace one table entry.
    pub fn insert(&mut self, surface: &str, lemma: &str) {
        self.lemmas
            .insert(Self::normalize(surface), Self::normalize(lemma));
    }

    /// Number of table entries.
    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }

    fn normalize(token: &str) -> String {
        token.nfc().collect::<String>().to_lowercase()
    }

    fn analyze_word(&self, surface: &str, words: &mut Vec<Word>) {
        let normalized = Self::normalize(surface);
        if let Some(lemma) = self.lemmas.get(&normalized) {
            words.push(Word::new(surface, lemma.clone()));
            return;
        }

        if let Some((prefix, rest)) = self.split_clitic(surface) {
            if let Some(lemma) = self.lemmas.get(&Self::normalize(rest)) {
                words.push(Word::new(prefix, Self::normalize(prefix)));
                words.push(Word::new(rest, lemma.clone()));
                return;
            }
        }

        words.push(Word::new(surface, normalized));
    }

    fn split_clitic<'a>(&self, surface: &'a str) -> Option<(&'a str, &'a str)> {
        let first = surface.chars().next()?;
        if !self.clitic_prefixes.contains(&first) {
            return None;
        }
        let (prefix, rest) = surface.split_at(first.len_utf8());
        // A one-letter remainder is more likely a word than prefix + word.
        if rest.chars().count() < 2 {
            return None;
        }
        Some((prefix, rest))
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn lemmatize(&self, text: &str) -> Result<Vec<Sentence>> {
        let mut sentences = Vec::new();
        for raw in text.unicode_sentences() {
            let mut words = Vec::new();
            for surface in raw.unicode_words() {
                self.analyze_word(surface, &mut words);
            }
            if !words.is_empty() {
                sentences.push(Sentence::new(words));
            }
        }
        Ok(sentences)
    }

    fn name(&self) -> &str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hebrew() -> DictionaryLemmatizer {
        DictionaryLemmatizer::with_entries([
            ("כספים", "כסף"),
            ("הכסף", "כסף"),
            ("מזומן", "מזומן"),
            ("העברתי", "העביר"),
        ])
        .with_clitic_prefixes(['ב', 'ו', 'ל', 'ה'])
    }

    #[test]
    fn test_sentences_and_lemmas() {
        let sentences = hebrew()
            .lemmatize("העברתי כספים. זה הכל!")
            .unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(
            sentences[0].lemmas().collect::<Vec<_>>(),
            vec!["העביר", "כסף"]
        );
        assert_eq!(sentences[0].words[1].text, "כספים");
        assert_eq!(sentences[1].lemmas().collect::<Vec<_>>(), vec!["זה", "הכל"]);
    }

    #[test]
    fn test_clitic_prefix_split() {
        let sentences = hebrew().lemmatize("כספים במזומן").unwrap();
        let words = &sentences[0].words;
        assert_eq!(words.len(), 3);
        assert_eq!(words[1], Word::new("ב", "ב"));
        assert_eq!(words[2], Word::new("מזומן", "מזומן"));
    }

    #[test]
    fn test_known_word_is_not_split() {
        // "הכסף" is in the table, so the ה prefix stays attached.
        let sentences = hebrew().lemmatize("הכסף").unwrap();
        assert_eq!(sentences[0].words, vec![Word::new("הכסף", "כסף")]);
    }

    #[test]
    fn test_unknown_word_is_its_own_lemma() {
        let sentences = DictionaryLemmatizer::new().lemmatize("Offshore ACCOUNT").unwrap();
        assert_eq!(
            sentences[0].lemmas().collect::<Vec<_>>(),
            vec!["offshore", "account"]
        );
        assert_eq!(sentences[0].words[1].text, "ACCOUNT");
    }

    #[test]
    fn test_empty_text() {
        assert!(hebrew().lemmatize("").unwrap().is_empty());
        assert!(hebrew().lemmatize("   \n ").unwrap().is_empty());
        assert!(hebrew().lemmatize("?!").unwrap().is_empty());
    }

    #[test]
    fn test_from_tsv_reader() {
        let tsv = "# surface\tlemma\nran\trun\nש\"ח\tשקל\n\nfunds\tfund\n";
        let lemmatizer = DictionaryLemmatizer::from_tsv_reader(tsv.as_bytes()).unwrap();
        assert_eq!(lemmatizer.len(), 3);
        let lemmas = lemmatizer.phrase_lemmas("Ran funds").unwrap();
        assert_eq!(lemmas, vec!["run", "fund"]);
    }

    #[test]
    fn test_from_tsv_reader_rejects_single_column() {
        let tsv = "ran\trun\nbroken\n";
        let err = DictionaryLemmatizer::from_tsv_reader(tsv.as_bytes()).unwrap_err();
        assert!(matches!(err, LexRiskError::Csv(_) | LexRiskError::InvalidArgument(_)));
    }
}
