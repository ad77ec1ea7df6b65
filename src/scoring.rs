//! Risk scoring: phrase matching, score normalization, and the final
//! assessment handed back to callers.
//!
//! - `matcher`: sentence-scoped containment matching of lexicon entries
//! - `normalize`: saturating mapping of raw scores onto `0..=98`
//! - `assessment`: the caller-facing result and its severity band

pub mod assessment;
pub mod matcher;
pub mod normalize;

pub use assessment::{RiskAssessment, Severity};
pub use matcher::{
    MatchResult, PhraseMatcher, match_sentences, match_sentences_cancellable,
};
pub use normalize::{
    DEFAULT_MAX_SCORE, DEFAULT_MIN_ACTIONABLE_SCORE, MAX_NORMALIZED_SCORE, ScoreNormalizer,
    normalize_score,
};
