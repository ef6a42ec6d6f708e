//! # depchunk Chunker
//!
//! Token-bounded packing of a main source file together with its resolved
//! dependencies, producing prompt-sized units for a downstream text-generation
//! service.
//!
//! ## Algorithm
//!
//! ```text
//! main file + ordered dependencies
//!     │
//!     ├──> Content preparation (comment stripping, noise removal)
//!     │
//!     ├──> Token counting (heuristic or tokenizer.json)
//!     │
//!     └──> Greedy packing
//!          ├─> Main file cost is paid in every chunk
//!          ├─> Overflowing dependency seeds the next chunk
//!          └─> Emit Chunk[] with sequential ids
//! ```
//!
//! ## Example
//!
//! ```rust
//! use depchunk_chunker::{Chunker, ChunkerConfig, HeuristicCounter, SourceDocument};
//!
//! let chunker = Chunker::new(ChunkerConfig::with_budget(5000)).unwrap();
//! let main = SourceDocument::new("src/main/java/p/A.java", "class A extends B {}");
//! let deps = vec![SourceDocument::new("src/main/java/p/B.java", "class B {}")];
//!
//! let chunks = chunker.pack(0, &main, deps, &HeuristicCounter);
//! assert_eq!(chunks.len(), 1);
//! ```

mod chunker;
mod cleaner;
mod config;
mod error;
mod tokens;
mod types;

pub use chunker::Chunker;
pub use cleaner::clean_java_source;
pub use config::{ChunkerConfig, DEFAULT_TOKEN_BUDGET};
pub use error::{ChunkerError, Result};
pub use tokens::{HeuristicCounter, HfTokenizerCounter, TokenCounter};
pub use types::{Chunk, SourceDocument};
