use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod jsonl;

pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// Default upper bound (inclusive) of total tokens for a small project
pub const SMALL_PROJECT_MAX_TOKENS: usize = 8_000;

/// Default upper bound (inclusive) of total tokens for a medium project
pub const MEDIUM_PROJECT_MAX_TOKENS: usize = 20_000;

/// One emitted chunk, serialized as a single JSONL line
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ChunkRecord {
    pub project_id: u64,
    pub chunk_id: usize,
    pub content: ChunkContent,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ChunkContent {
    pub main_file_path: String,
    pub main_file_content: String,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct DependencyRecord {
    pub file_path: String,
    pub file_content: String,
}

/// Size class of a project by total token count
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectSize {
    Small,
    Medium,
    Large,
}

impl ProjectSize {
    pub const ALL: [ProjectSize; 3] = [Self::Small, Self::Medium, Self::Large];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// Output file name used for records of this size class
    pub fn jsonl_file_name(self) -> String {
        format!("{}.jsonl", self.as_str())
    }
}

/// Inclusive token thresholds separating the size classes
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct SizeThresholds {
    pub small_max: usize,
    pub medium_max: usize,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            small_max: SMALL_PROJECT_MAX_TOKENS,
            medium_max: MEDIUM_PROJECT_MAX_TOKENS,
        }
    }
}

impl SizeThresholds {
    pub const fn classify(&self, total_tokens: usize) -> ProjectSize {
        if total_tokens <= self.small_max {
            ProjectSize::Small
        } else if total_tokens <= self.medium_max {
            ProjectSize::Medium
        } else {
            ProjectSize::Large
        }
    }
}

/// Per-project summary written by the metadata pass
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ProjectMetadata {
    /// Project directory name
    pub project_id: String,
    pub total_tokens: usize,
    pub project_size: ProjectSize,
    /// Source files, relative to the project root
    pub java_files: Vec<String>,
}

/// Escape literal newlines and carriage returns as two-character sequences
/// so a record never spans more than one line.
pub fn escape_newlines(text: &str) -> String {
    text.replace('\n', "\\n").replace('\r', "\\r")
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

pub fn parse_metadata(text: &str) -> Result<Vec<ProjectMetadata>> {
    serde_json::from_str(text).context("invalid project metadata")
}

/// JSON schema of the emitted chunk record
pub fn chunk_record_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(ChunkRecord)).unwrap_or_default()
}
