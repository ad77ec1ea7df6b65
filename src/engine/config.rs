use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LexRiskError, Result};
use crate::expansion::expander::ExpansionConfig;
use crate::expansion::queue::QueueConfig;
use crate::scoring::normalize::{DEFAULT_MAX_SCORE, DEFAULT_MIN_ACTIONABLE_SCORE, ScoreNormalizer};

/// Configuration for the risk engine.
///
/// Every section has defaults, so an empty TOML/JSON document is a valid
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub expansion: ExpansionConfig,
    pub queue: QueueConfig,
    pub reload: ReloadPolicy,
}

impl EngineConfig {
    /// Check every section for values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.expansion.validate()?;
        self.queue.validate()?;
        self.reload.validate()
    }
}

/// Scoring and normalization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Raw score treated as maximally suspicious.
    pub max_score: u64,
    /// Raw scores at or below this value normalize to 0.
    pub min_actionable_score: u64,
    /// Wall-clock budget of one scoring call, in milliseconds.
    pub timeout_ms: u64,
    /// Scoring pool size; 0 uses one thread per CPU.
    pub worker_threads: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            max_score: DEFAULT_MAX_SCORE,
            min_actionable_score: DEFAULT_MIN_ACTIONABLE_SCORE,
            timeout_ms: 30_000,
            worker_threads: 0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_score == 0 {
            return Err(LexRiskError::invalid_config(
                "scoring.max_score must be positive",
            ));
        }
        if self.timeout_ms == 0 {
            return Err(LexRiskError::invalid_config(
                "scoring.timeout_ms must be positive",
            ));
        }
        Ok(())
    }

    pub fn normalizer(&self) -> Result<ScoreNormalizer> {
        ScoreNormalizer::new(self.max_score, self.min_actionable_score)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolved pool size.
    pub fn threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }
}

/// When scoring calls pick up lexicon changes made outside the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Refresh only after appends made through this engine.
    #[default]
    OnWrite,
    /// Re-read the store before every scoring call.
    PerRequest,
    /// Re-read the store when the snapshot is older than `secs`.
    Interval { secs: u64 },
}

impl ReloadPolicy {
    pub fn validate(&self) -> Result<()> {
        match self {
            ReloadPolicy::Interval { secs: 0 } => Err(LexRiskError::invalid_config(
                "reload.secs must be positive",
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.scoring.max_score, 600);
        assert_eq!(config.scoring.min_actionable_score, 5);
        assert_eq!(config.scoring.timeout(), Duration::from_secs(30));
        assert_eq!(config.expansion.topn, 10);
        assert_eq!(config.queue.capacity, 32);
        assert_eq!(config.reload, ReloadPolicy::OnWrite);
        assert!(config.validate().is_ok());
        assert!(config.scoring.threads() >= 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"scoring": {"max_score": 500}, "reload": {"mode": "interval", "secs": 60}}"#,
        )
        .unwrap();
        assert_eq!(config.scoring.max_score, 500);
        assert_eq!(config.scoring.timeout_ms, 30_000);
        assert_eq!(config.reload, ReloadPolicy::Interval { secs: 60 });
        assert_eq!(config.expansion, ExpansionConfig::default());
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.scoring.max_score = 0;
        assert!(matches!(
            config.validate(),
            Err(LexRiskError::InvalidConfig(_))
        ));

        let mut config = EngineConfig::default();
        config.reload = ReloadPolicy::Interval { secs: 0 };
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.queue.workers = 0;
        assert!(config.validate().is_err());
    }
}
