use serde::{Deserialize, Serialize};

/// Statistics about one project build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Module roots found (0 when the project was scanned flat)
    pub modules: usize,

    /// Source files discovered
    pub files: usize,

    /// Entries in the declaration index
    pub declarations: usize,

    /// Declarations shadowed by a later file
    pub collisions: usize,

    /// Files left out because they could not be read or parsed
    pub parse_failures: usize,

    /// Dependency edges in the graph
    pub edges: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files that made it into the graph
    pub fn parsed_files(&self) -> usize {
        self.files.saturating_sub(self.parse_failures)
    }
}
