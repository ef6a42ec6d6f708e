use serde::{Deserialize, Serialize};

/// Token budget used when nothing else is configured
pub const DEFAULT_TOKEN_BUDGET: usize = 5000;

/// Configuration for chunk packing behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum combined token count of a chunk (main file + dependencies).
    /// A single dependency that does not fit is still placed in its own chunk.
    pub token_budget: usize,

    /// Strip comments and noise from file contents before counting tokens
    pub clean_sources: bool,

    /// Escape literal `\n` / `\r` in emitted contents so each record stays on one line
    pub escape_newlines: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            token_budget: DEFAULT_TOKEN_BUDGET,
            clean_sources: true,
            escape_newlines: true,
        }
    }
}

impl ChunkerConfig {
    /// Config with a specific budget and the remaining defaults
    pub fn with_budget(token_budget: usize) -> Self {
        Self {
            token_budget,
            ..Default::default()
        }
    }

    /// Keep file contents exactly as read from disk
    pub fn raw() -> Self {
        Self {
            clean_sources: false,
            escape_newlines: false,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.token_budget == 0 {
            return Err("token_budget must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.token_budget, DEFAULT_TOKEN_BUDGET);
    }

    #[test]
    fn test_preset_configs_valid() {
        assert!(ChunkerConfig::with_budget(150).validate().is_ok());
        assert!(ChunkerConfig::raw().validate().is_ok());
        assert!(!ChunkerConfig::raw().clean_sources);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = ChunkerConfig::with_budget(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ChunkerConfig = serde_json::from_str(r#"{"token_budget": 42}"#).unwrap();
        assert_eq!(config.token_budget, 42);
        assert!(config.clean_sources);
        assert!(config.escape_newlines);
    }
}
