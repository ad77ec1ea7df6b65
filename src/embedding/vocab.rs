//! Conversions between surface phrases and embedding vocabulary tokens.
//!
//! Phrase-aware embedding vocabularies store multi-word expressions as a
//! single token joined by `~` (`הלבנת~הון`), and some tag tokens with a
//! part-of-speech prefix (`NN_הון`).

/// Joiner used inside multi-word vocabulary tokens.
pub const PHRASE_JOINER: char = '~';

/// Vocabulary key for a surface phrase: whitespace runs become `~`.
pub fn to_vocab_key(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&PHRASE_JOINER.to_string())
}

/// Surface phrase for a vocabulary token.
///
/// Drops everything up to the first `_` (a part-of-speech tag) and turns `~`
/// joiners back into spaces.
pub fn clean_token(token: &str) -> String {
    let untagged = match token.split_once('_') {
        Some((_, rest)) => rest,
        None => token,
    };
    untagged
        .split(PHRASE_JOINER)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
