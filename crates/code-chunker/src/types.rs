use crate::tokens::TokenCounter;
use depchunk_protocol::{escape_newlines, ChunkContent, ChunkRecord, DependencyRecord};
use serde::{Deserialize, Serialize};

/// A file path together with its (already loaded) content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDocument {
    /// Project-root-relative path
    pub path: String,

    /// File content
    pub content: String,
}

impl SourceDocument {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// One prompt unit: a main file plus a subset of its dependencies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub project_id: u64,

    /// 0-based, sequential per main file
    pub chunk_id: usize,

    pub main_file_path: String,

    pub main_file_content: String,

    pub dependencies: Vec<SourceDocument>,
}

impl Chunk {
    /// Create an empty chunk seeded with the main file
    #[must_use]
    pub fn new(project_id: u64, chunk_id: usize, main: &SourceDocument) -> Self {
        Self {
            project_id,
            chunk_id,
            main_file_path: main.path.clone(),
            main_file_content: main.content.clone(),
            dependencies: Vec::new(),
        }
    }

    /// Token weight: main file plus every dependency
    pub fn weight(&self, counter: &dyn TokenCounter) -> usize {
        self.dependencies
            .iter()
            .map(|dep| counter.count(&dep.content))
            .fold(counter.count(&self.main_file_content), usize::saturating_add)
    }

    /// Convert into the emitted record format
    #[must_use]
    pub fn to_record(&self, escape: bool) -> ChunkRecord {
        let text = |content: &str| {
            if escape {
                escape_newlines(content)
            } else {
                content.to_string()
            }
        };

        ChunkRecord {
            project_id: self.project_id,
            chunk_id: self.chunk_id,
            content: ChunkContent {
                main_file_path: self.main_file_path.clone(),
                main_file_content: text(&self.main_file_content),
                dependencies: self
                    .dependencies
                    .iter()
                    .map(|dep| DependencyRecord {
                        file_path: dep.path.clone(),
                        file_content: text(&dep.content),
                    })
                    .collect(),
            },
        }
    }
}
