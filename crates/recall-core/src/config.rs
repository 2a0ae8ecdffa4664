use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RecallError, Result};

/// Top-level configuration for the content intelligence engine.
///
/// Loaded from `~/.recall/config.toml` by default. The numeric constants
/// here (decay half-life, bonuses, ranking weights) were chosen
/// empirically; they are exposed as configuration rather than re-derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl RecallConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RecallConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RecallError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Importance scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Half-life of the per-submission time decay, in hours.
    pub decay_half_life_hours: f64,
    /// Floor of the importance score. An empty history scores exactly this.
    pub base_score: f64,
    /// Ceiling of the importance score.
    pub max_score: f64,
    /// Velocity bonus per resubmission within the last 24 hours.
    pub velocity_bonus_step: f64,
    /// Cap on the total velocity bonus.
    pub velocity_bonus_cap: f64,
    /// Recency boost when the newest submission is at most 1 hour old.
    pub recency_boost_1h: f64,
    /// Recency boost when the newest submission is at most 6 hours old.
    pub recency_boost_6h: f64,
    /// Recency boost when the newest submission is at most 24 hours old.
    pub recency_boost_24h: f64,
    /// Score at or above which an item is urgent outright.
    pub high_urgency_score: f64,
    /// Score at or above which an item is at least medium urgency.
    pub medium_urgency_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            decay_half_life_hours: 24.0,
            base_score: 1.0,
            max_score: 10.0,
            velocity_bonus_step: 0.8,
            velocity_bonus_cap: 3.0,
            recency_boost_1h: 1.5,
            recency_boost_6h: 1.0,
            recency_boost_24h: 0.5,
            high_urgency_score: 7.0,
            medium_urgency_score: 4.0,
        }
    }
}

/// Composite ranking parameters. The four weights sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub semantic_weight: f64,
    pub importance_weight: f64,
    pub urgency_weight: f64,
    pub recency_weight: f64,
    /// Half-life of the recency multiplier, in hours (7 days).
    pub recency_half_life_hours: f64,
    /// Floor of the recency multiplier so old items never vanish entirely.
    pub recency_floor: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.4,
            importance_weight: 0.3,
            urgency_weight: 0.2,
            recency_weight: 0.1,
            recency_half_life_hours: 7.0 * 24.0,
            recency_floor: 0.1,
        }
    }
}

/// Query analysis and result sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Result limit for ordinary queries.
    pub default_limit: usize,
    /// Raised result limit when the query asks for an aggregation.
    pub aggregation_limit: usize,
    /// Importance threshold applied to trend queries.
    pub trend_min_importance: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            aggregation_limit: 25,
            trend_min_importance: 5.0,
        }
    }
}

/// Embedding provider parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Vector dimensionality, fixed for the process lifetime.
    pub dimensions: usize,
    /// Bound on a single provider call before falling back locally.
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: 384,
            timeout_ms: 3_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_constants() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.decay_half_life_hours, 24.0);
        assert_eq!(cfg.base_score, 1.0);
        assert_eq!(cfg.max_score, 10.0);
        assert_eq!(cfg.velocity_bonus_step, 0.8);
        assert_eq!(cfg.velocity_bonus_cap, 3.0);
        assert_eq!(cfg.high_urgency_score, 7.0);
        assert_eq!(cfg.medium_urgency_score, 4.0);
    }

    #[test]
    fn test_default_ranking_weights_sum_to_one() {
        let cfg = RankingConfig::default();
        let sum =
            cfg.semantic_weight + cfg.importance_weight + cfg.urgency_weight + cfg.recency_weight;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_recency_half_life_is_seven_days() {
        let cfg = RankingConfig::default();
        assert_eq!(cfg.recency_half_life_hours, 168.0);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let cfg = RecallConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(cfg.query.default_limit, 10);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = RecallConfig::default();
        cfg.query.default_limit = 42;
        cfg.scoring.decay_half_life_hours = 12.0;
        cfg.save(&path).unwrap();

        let loaded = RecallConfig::load(&path).unwrap();
        assert_eq!(loaded.query.default_limit, 42);
        assert_eq!(loaded.scoring.decay_half_life_hours, 12.0);
        // Untouched sections keep their defaults.
        assert_eq!(loaded.ranking.semantic_weight, 0.4);
    }

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let partial = r#"
[query]
default_limit = 5
"#;
        let cfg: RecallConfig = toml::from_str(partial).unwrap();
        assert_eq!(cfg.query.default_limit, 5);
        assert_eq!(cfg.query.aggregation_limit, 25);
        assert_eq!(cfg.embedding.dimensions, 384);
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [ valid").unwrap();
        assert!(RecallConfig::load(&path).is_err());
    }
}
