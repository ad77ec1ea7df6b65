//! Saturating score normalization.
//!
//! Raw scores at or below the actionable floor map to 0. Above it, the raw
//! score is expressed as a percentage of `max_score`, rounded down, and capped
//! at [`MAX_NORMALIZED_SCORE`]. Values 99 and 100 are never produced; they are
//! left for manual escalation outside this crate.

use crate::error::{LexRiskError, Result};

/// Highest score the normalizer ever returns.
pub const MAX_NORMALIZED_SCORE: u8 = 98;

/// Raw score regarded as maximally suspicious unless configured otherwise.
pub const DEFAULT_MAX_SCORE: u64 = 600;

/// Raw scores at or below this value are not actionable.
pub const DEFAULT_MIN_ACTIONABLE_SCORE: u64 = 5;

/// Maps raw match scores onto `0..=98`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreNormalizer {
    max_score: u64,
    min_actionable_score: u64,
}

impl ScoreNormalizer {
    pub fn new(max_score: u64, min_actionable_score: u64) -> Result<Self> {
        if max_score == 0 {
            return Err(LexRiskError::invalid_config("max_score must be positive"));
        }
        Ok(ScoreNormalizer {
            max_score,
            min_actionable_score,
        })
    }

    pub fn normalize(&self, raw_score: u64) -> u8 {
        if raw_score <= self.min_actionable_score {
            return 0;
        }
        let percent = raw_score.saturating_mul(100) / self.max_score;
        percent.min(u64::from(MAX_NORMALIZED_SCORE)) as u8
    }

    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    pub fn min_actionable_score(&self) -> u64 {
        self.min_actionable_score
    }
}

impl Default for ScoreNormalizer {
    fn default() -> Self {
        ScoreNormalizer {
            max_score: DEFAULT_MAX_SCORE,
            min_actionable_score: DEFAULT_MIN_ACTIONABLE_SCORE,
        }
    }
}

/// Normalize `raw_score` against `max_score` with the default floor.
///
/// A zero `max_score` saturates every actionable score.
pub fn normalize_score(raw_score: u64, max_score: u64) -> u8 {
    match ScoreNormalizer::new(max_score, DEFAULT_MIN_ACTIONABLE_SCORE) {
        Ok(normalizer) => normalizer.normalize(raw_score),
        Err(_) if raw_score > DEFAULT_MIN_ACTIONABLE_SCORE => MAX_NORMALIZED_SCORE,
        Err(_) => 0,
    }
}
