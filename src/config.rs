//! Tunable game constants, loadable from JSON handed over by the host page.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const DEFAULT_STORAGE_KEY: &str = "underless_uoh_state";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Recently shown names excluded from fresh picks. History is trimmed back
    /// to this many entries once it grows past twice the limit.
    pub memory_limit: usize,
    /// Narrower exclusion window used when the normal one leaves too few picks.
    pub relaxed_memory: usize,
    /// Below this many fresh candidates the exclusion window is relaxed.
    pub min_fresh_candidates: usize,
    /// Time between a correct outcome and the promoted round being shown
    /// (count-up reveal plus result overlay).
    pub promotion_delay_ms: f64,
    pub storage_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            memory_limit: 20,
            relaxed_memory: 5,
            min_fresh_candidates: 3,
            promotion_delay_ms: 3500.0,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let cfg: GameConfig =
            serde_json::from_str(json).map_err(|e| GameError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.memory_limit == 0 {
            return Err(GameError::Config("memory_limit must be positive".into()));
        }
        if self.relaxed_memory > self.memory_limit {
            return Err(GameError::Config(format!(
                "relaxed_memory ({}) exceeds memory_limit ({})",
                self.relaxed_memory, self.memory_limit
            )));
        }
        if !self.promotion_delay_ms.is_finite() || self.promotion_delay_ms < 0.0 {
            return Err(GameError::Config(format!(
                "promotion_delay_ms must be a non-negative number, got {}",
                self.promotion_delay_ms
            )));
        }
        if self.storage_key.is_empty() {
            return Err(GameError::Config("storage_key must not be empty".into()));
        }
        Ok(())
    }

    /// Hard cap on the used-name history length.
    pub fn history_cap(&self) -> usize {
        self.memory_limit * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{"promotion_delay_ms": 100}"#).unwrap();
        assert_eq!(cfg.promotion_delay_ms, 100.0);
        assert_eq!(cfg.memory_limit, 20);
        assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(cfg.history_cap(), 40);
    }

    #[test]
    fn test_rejects_relaxed_window_wider_than_memory() {
        let err = GameConfig::from_json(r#"{"memory_limit": 4, "relaxed_memory": 5}"#);
        assert!(matches!(err, Err(GameError::Config(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(GameConfig::from_json("{not json").is_err());
    }
}
