use crate::error::{ChunkerError, Result};
use std::path::Path;
use tokenizers::Tokenizer;

/// Counts tokens in a piece of text.
///
/// Implementations must be deterministic and pure: the same text always
/// yields the same count.
pub trait TokenCounter {
    fn count(&self, text: &str) -> usize;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Rough estimate: 4 bytes per token on average for code
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        text.len().div_ceil(4)
    }
}

/// Token counter backed by a `tokenizer.json` file (BPE/WordPiece/etc.)
pub struct HfTokenizerCounter {
    tokenizer: Tokenizer,
}

impl HfTokenizerCounter {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            ChunkerError::tokenizer(format!("failed to load {}: {e}", path.display()))
        })?;
        Ok(Self { tokenizer })
    }

    pub fn try_count(&self, text: &str) -> Result<usize> {
        self.tokenizer
            .encode(text, false)
            .map(|encoding| encoding.len())
            .map_err(|e| ChunkerError::tokenizer(e.to_string()))
    }
}

impl TokenCounter for HfTokenizerCounter {
    fn count(&self, text: &str) -> usize {
        match self.try_count(text) {
            Ok(count) => count,
            Err(err) => {
                log::warn!("Tokenizer failed, falling back to estimate: {err}");
                HeuristicCounter.count(text)
            }
        }
    }
}
