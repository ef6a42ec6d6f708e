use anyhow::{anyhow, Context, Result};
use depchunk_chunker::{ChunkerConfig, HeuristicCounter, HfTokenizerCounter, TokenCounter};
use depchunk_indexer::{IndexerConfig, ScanOptions};
use depchunk_protocol::SizeThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file for the `depchunk` binary. Every field has a default, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepchunkConfig {
    pub scan: ScanOptions,
    pub chunker: ChunkerConfig,
    pub sizes: SizeThresholds,

    /// `tokenizer.json` used for counting; the byte estimate is used when unset
    pub tokenizer: Option<PathBuf>,
}

impl DepchunkConfig {
    /// Load from a JSON or TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&bytes)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice(bytes) {
            Ok(config) => Ok(config),
            Err(json_err) => {
                let utf8 =
                    std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!(
                        "Config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    )
                })
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.indexer_config()
            .validate()
            .map_err(|err| anyhow!("Invalid configuration: {err}"))
    }

    pub fn indexer_config(&self) -> IndexerConfig {
        IndexerConfig {
            scan: self.scan.clone(),
            chunker: self.chunker.clone(),
            sizes: self.sizes,
        }
    }

    pub fn token_counter(&self) -> Result<Box<dyn TokenCounter>> {
        match &self.tokenizer {
            Some(path) => {
                log::info!("Counting tokens with {}", path.display());
                Ok(Box::new(HfTokenizerCounter::from_file(path)?))
            }
            None => Ok(Box::new(HeuristicCounter)),
        }
    }
}
