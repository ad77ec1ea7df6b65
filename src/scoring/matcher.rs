//! Sentence-scoped phrase matching.
//!
//! An entry matches a sentence when every one of its lemmas occurs somewhere
//! in that sentence. Word order and adjacency are ignored, and a sentence is
//! the widest scope a match may span.
//!
//! The matched surface phrase is rebuilt from the first occurrence of each
//! entry lemma, in the entry's lemma order. Tokens longer than one character
//! are followed by a space; single-character tokens (clitic prefixes) are
//! glued to whatever follows.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::analysis::lemmatizer::{Lemmatizer, Sentence};
use crate::lexicon::entry::LexiconEntry;
use crate::lexicon::snapshot::LexiconSnapshot;

/// Outcome of matching one text against one lexicon snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Sum of the scores of every match occurrence.
    pub total_score: u64,
    /// Distinct categories, in the order they first matched.
    pub matched_categories: Vec<String>,
    /// One reconstructed phrase per match occurrence; duplicates are kept.
    pub matched_phrases: Vec<String>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.matched_phrases.is_empty()
    }
}

/// Matches texts against a lexicon snapshot.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl PhraseMatcher {
    pub fn new(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        PhraseMatcher { lemmatizer }
    }

    /// Lemmatize `text` and match it against `lexicon`.
    ///
    /// A lemmatizer failure degrades to an empty result.
    pub fn match_text(&self, text: &str, lexicon: &LexiconSnapshot) -> MatchResult {
        self.match_text_cancellable(text, lexicon, &AtomicBool::new(false))
            .unwrap_or_default()
    }

    /// Like [`match_text`](Self::match_text), but gives up and returns `None`
    /// once `cancel` is set. The flag is checked before lemmatizing and
    /// between sentences.
    pub fn match_text_cancellable(
        &self,
        text: &str,
        lexicon: &LexiconSnapshot,
        cancel: &AtomicBool,
    ) -> Option<MatchResult> {
        if text.trim().is_empty() {
            return Some(MatchResult::default());
        }
        if cancel.load(Ordering::Acquire) {
            return None;
        }
        match self.lemmatizer.lemmatize(text) {
            Ok(sentences) => match_sentences_cancellable(&sentences, lexicon.entries(), cancel),
            Err(err) => {
                log::warn!(
                    "lemmatizer '{}' failed, scoring as no match: {err}",
                    self.lemmatizer.name()
                );
                Some(MatchResult::default())
            }
        }
    }
}

/// Match already lemmatized sentences against `entries`.
pub fn match_sentences(sentences: &[Sentence], entries: &[LexiconEntry]) -> MatchResult {
    match_sentences_cancellable(sentences, entries, &AtomicBool::new(false)).unwrap_or_default()
}

/// Match sentences until done or until `cancel` is set, in which case the
/// partial result is dropped and `None` is returned.
pub fn match_sentences_cancellable(
    sentences: &[Sentence],
    entries: &[LexiconEntry],
    cancel: &AtomicBool,
) -> Option<MatchResult> {
    let mut result = MatchResult::default();
    let mut seen_categories = AHashSet::new();

    for sentence in sentences {
        if cancel.load(Ordering::Acquire) {
            return None;
        }
        let first_index = first_occurrences(sentence);

        for entry in entries.iter().filter(|e| e.is_matchable()) {
            let Some(indices) = entry
                .lemmas
                .iter()
                .map(|lemma| first_index.get(lemma.as_str()).copied())
                .collect::<Option<Vec<usize>>>()
            else {
                continue;
            };

            result.total_score += u64::from(entry.score);
            if seen_categories.insert(entry.category.as_str()) {
                result.matched_categories.push(entry.category.clone());
            }
            result
                .matched_phrases
                .push(reconstruct_phrase(sentence, &indices));
        }
    }

    Some(result)
}

/// Lemma → index of its first occurrence in the sentence.
fn first_occurrences(sentence: &Sentence) -> AHashMap<&str, usize> {
    let mut first_index = AHashMap::with_capacity(sentence.len());
    for (i, lemma) in sentence.lemmas().enumerate() {
        first_index.entry(lemma).or_insert(i);
    }
    first_index
}

fn reconstruct_phrase(sentence: &Sentence, indices: &[usize]) -> String {
    let mut phrase = String::new();
    for &i in indices {
        let text = sentence.words[i].text.as_str();
        phrase.push_str(text);
        if text.chars().count() > 1 {
            phrase.push(' ');
        }
    }
    phrase.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::lemmatizer::Word;
    use crate::error::{LexRiskError, Result};
    use crate::lexicon::entry::LexiconRow;

    fn entry(score: u32, lemmas: &[&str], category: &str) -> LexiconEntry {
        LexiconEntry::new(
            LexiconRow::new(score, lemmas.join(" "), category),
            lemmas.iter().map(|l| l.to_string()).collect(),
        )
    }

    fn sentence(words: &[(&str, &str)]) -> Sentence {
        Sentence::new(words.iter().map(|(t, l)| Word::new(*t, *l)).collect())
    }

    #[test]
    fn test_containment_match() {
        let entries = vec![entry(40, &["כסף", "מזומן"], "cash")];
        let sentences = vec![sentence(&[
            ("העביר", "העביר"),
            ("מזומן", "מזומן"),
            ("כספים", "כסף"),
        ])];

        let result = match_sentences(&sentences, &entries);
        assert_eq!(result.total_score, 40);
        assert_eq!(result.matched_categories, vec!["cash"]);
        // Phrase follows the entry's lemma order, using surface forms.
        assert_eq!(result.matched_phrases, vec!["כספים מזומן"]);
    }

    #[test]
    fn test_partial_overlap_does_not_match() {
        let entries = vec![entry(40, &["כסף", "מזומן"], "cash")];
        let sentences = vec![sentence(&[("כסף", "כסף"), ("העביר", "העביר")])];
        let result = match_sentences(&sentences, &entries);
        assert_eq!(result, MatchResult::default());
    }

    #[test]
    fn test_match_does_not_span_sentences() {
        let entries = vec![entry(40, &["כסף", "מזומן"], "cash")];
        let sentences = vec![
            sentence(&[("כסף", "כסף")]),
            sentence(&[("מזומן", "מזומן")]),
        ];
        assert!(match_sentences(&sentences, &entries).is_empty());
    }

    #[test]
    fn test_empty_lemmas_never_match() {
        let entries = vec![entry(99, &[], "vacuous")];
        let sentences = vec![sentence(&[("anything", "anything")])];
        assert!(match_sentences(&sentences, &entries).is_empty());
    }

    #[test]
    fn test_duplicates_across_sentences_are_kept() {
        let entries = vec![entry(10, &["cash"], "cash"), entry(20, &["wire"], "wire")];
        let sentences = vec![
            sentence(&[("cash", "cash"), ("wire", "wire")]),
            sentence(&[("Cash", "cash")]),
        ];

        let result = match_sentences(&sentences, &entries);
        assert_eq!(result.total_score, 40);
        assert_eq!(result.matched_phrases, vec!["cash", "wire", "Cash"]);
        assert_eq!(result.matched_categories, vec!["cash", "wire"]);
    }

    #[test]
    fn test_repeated_lemma_uses_first_occurrence() {
        let entries = vec![entry(10, &["fund"], "fund")];
        let sentences = vec![sentence(&[("funds", "fund"), ("funding", "fund")])];
        let result = match_sentences(&sentences, &entries);
        assert_eq!(result.matched_phrases, vec!["funds"]);
    }

    #[test]
    fn test_single_character_tokens_attach_to_next() {
        let entries = vec![entry(30, &["ב", "מזומן", "כסף"], "cash")];
        let sentences = vec![sentence(&[
            ("כספים", "כסף"),
            ("ב", "ב"),
            ("מזומן", "מזומן"),
        ])];
        let result = match_sentences(&sentences, &entries);
        assert_eq!(result.matched_phrases, vec!["במזומן כספים"]);
    }

    #[test]
    fn test_order_independence() {
        let entries = vec![entry(40, &["offshore", "account"], "shell")];
        let forward = vec![sentence(&[("offshore", "offshore"), ("account", "account")])];
        let backward = vec![sentence(&[("account", "account"), ("offshore", "offshore")])];

        let a = match_sentences(&forward, &entries);
        let b = match_sentences(&backward, &entries);
        assert_eq!(a.total_score, b.total_score);
        assert_eq!(a.matched_categories, b.matched_categories);
        assert_eq!(a.matched_phrases, vec!["offshore account"]);
        assert_eq!(b.matched_phrases, vec!["offshore account"]);
    }

    #[derive(Debug)]
    struct FailingLemmatizer;

    impl Lemmatizer for FailingLemmatizer {
        fn lemmatize(&self, _text: &str) -> Result<Vec<Sentence>> {
            Err(LexRiskError::lemmatization("corrupt input"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_lemmatizer_failure_is_no_match() {
        let lexicon = LexiconSnapshot::default();
        let matcher = PhraseMatcher::new(Arc::new(FailingLemmatizer));
        assert_eq!(matcher.match_text("whatever", &lexicon), MatchResult::default());
    }

    #[test]
    fn test_cancelled_match_stops_before_lemmatizing() {
        let lexicon = LexiconSnapshot::default();
        let matcher = PhraseMatcher::new(Arc::new(FailingLemmatizer));
        let cancel = AtomicBool::new(true);
        // The failing lemmatizer would have produced an empty result.
        assert_eq!(matcher.match_text_cancellable("whatever", &lexicon, &cancel), None);
    }

    #[test]
    fn test_cancelled_match_stops_between_sentences() {
        let entries = vec![entry(10, &["cash"], "cash")];
        let sentences = vec![sentence(&[("cash", "cash")])];

        let cancel = AtomicBool::new(false);
        let result = match_sentences_cancellable(&sentences, &entries, &cancel).unwrap();
        assert_eq!(result.total_score, 10);

        cancel.store(true, Ordering::Release);
        assert_eq!(match_sentences_cancellable(&sentences, &entries, &cancel), None);
    }
}
