use crate::cleaner::clean_java_source;
use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::tokens::TokenCounter;
use crate::types::{Chunk, SourceDocument};

/// Packs a main file and its dependencies into token-bounded chunks
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create new chunker with configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    /// Get current configuration
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Apply the configured content preparation (cleaning) to a file body
    pub fn prepare_content(&self, content: &str) -> String {
        if self.config.clean_sources {
            clean_java_source(content)
        } else {
            content.to_string()
        }
    }

    /// Greedy single-pass packing.
    ///
    /// Every chunk repeats the main file. A dependency that would push the
    /// running total over the budget closes the current chunk and seeds the
    /// next one, even when it alone exceeds the budget: dependencies are never
    /// dropped. The result always holds at least one chunk.
    pub fn pack(
        &self,
        project_id: u64,
        main: &SourceDocument,
        dependencies: impl IntoIterator<Item = SourceDocument>,
        counter: &dyn TokenCounter,
    ) -> Vec<Chunk> {
        let budget = self.config.token_budget;
        let main_tokens = counter.count(&main.content);

        let mut chunks = Vec::new();
        let mut current = Chunk::new(project_id, 0, main);
        let mut running = main_tokens;

        for dep in dependencies {
            let dep_tokens = counter.count(&dep.content);

            if running.saturating_add(dep_tokens) > budget {
                let next_id = chunks.len() + 1;
                let closed = std::mem::replace(&mut current, Chunk::new(project_id, next_id, main));
                chunks.push(closed);
                running = main_tokens;

                if main_tokens.saturating_add(dep_tokens) > budget {
                    log::debug!(
                        "Dependency {} ({} tokens) exceeds budget {} with main file {}",
                        dep.path,
                        dep_tokens,
                        budget,
                        main.path
                    );
                }
            }

            running = running.saturating_add(dep_tokens);
            current.dependencies.push(dep);
        }

        chunks.push(current);
        chunks
    }
}
