//! # Depchunk Indexer
//!
//! Per-project pipeline: module discovery, dependency resolution and
//! token-bounded chunk packing.
//!
//! ## Pipeline
//!
//! ```text
//! Project root
//!     │
//!     ├──> Module Scanner (manifest markers, source roots)
//!     │      └─> Sorted source files
//!     │
//!     ├──> Graph Builder (parse, index, resolve)
//!     │      └─> ProjectGraph
//!     │
//!     └──> Chunker (greedy, token budget)
//!            └─> Chunks, one sequence per main file
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use depchunk_chunker::HeuristicCounter;
//! use depchunk_indexer::{IndexerConfig, ProjectIndexer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let indexer = ProjectIndexer::new("/path/to/project", IndexerConfig::default()).await?;
//!     let project = indexer.build().await?;
//!     let chunks = indexer.chunks(0, &project, &HeuristicCounter)?;
//!
//!     println!("{} files, {} chunks", project.stats.files, chunks.len());
//!     Ok(())
//! }
//! ```

mod error;
mod indexer;
mod projects;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::{path_string, IndexerConfig, ProjectGraph, ProjectIndexer};
pub use projects::{discover_projects, project_name};
pub use scanner::{ModuleScanner, ScanOptions, ScanResult};
pub use stats::IndexStats;
