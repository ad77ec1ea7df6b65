use serde::{Deserialize, Serialize};

use crate::scoring::matcher::MatchResult;
use crate::scoring::normalize::ScoreNormalizer;

/// Coarse severity band of a normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// `< 30` is low, `< 70` is medium, anything above is high.
    pub fn from_score(normalized_score: u8) -> Self {
        match normalized_score {
            0..30 => Severity::Low,
            30..70 => Severity::Medium,
            _ => Severity::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The risk verdict for one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Normalized score in `0..=98`.
    pub normalized_score: u8,
    /// Reconstructed surface phrase of every match occurrence.
    pub matched_phrases: Vec<String>,
    /// Distinct matched categories.
    pub categories: Vec<String>,
    /// Raw sum of matched entry scores.
    pub raw_score: u64,
    pub severity: Severity,
}

impl RiskAssessment {
    /// The assessment of a text with no matches.
    pub fn empty() -> Self {
        RiskAssessment {
            normalized_score: 0,
            matched_phrases: Vec::new(),
            categories: Vec::new(),
            raw_score: 0,
            severity: Severity::Low,
        }
    }

    pub fn from_match(result: MatchResult, normalizer: &ScoreNormalizer) -> Self {
        let normalized_score = normalizer.normalize(result.total_score);
        RiskAssessment {
            normalized_score,
            matched_phrases: result.matched_phrases,
            categories: result.matched_categories,
            raw_score: result.total_score,
            severity: Severity::from_score(normalized_score),
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.normalized_score > 0
    }
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self::empty()
    }
}
