use crate::error::{IndexerError, Result};
use crate::scanner::{ModuleScanner, ScanOptions, ScanResult};
use crate::stats::IndexStats;
use depchunk_chunker::{Chunk, Chunker, ChunkerConfig, SourceDocument, TokenCounter};
use depchunk_graph::{
    DeclarationIndex, DependencyGraph, GraphBuilder, ParseFailure, Resolution, SourceFile,
};
use depchunk_protocol::{ProjectMetadata, SizeThresholds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Settings shared by every project run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub scan: ScanOptions,
    pub chunker: ChunkerConfig,
    pub sizes: SizeThresholds,
}

impl IndexerConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.scan.validate()?;
        self.chunker.validate()?;
        if self.sizes.small_max > self.sizes.medium_max {
            return Err(format!(
                "sizes.small_max ({}) must not exceed sizes.medium_max ({})",
                self.sizes.small_max, self.sizes.medium_max
            ));
        }
        Ok(())
    }
}

/// Resolved dependency graph of one project. Paths are relative to the
/// project root.
#[derive(Debug, Clone, Default)]
pub struct ProjectGraph {
    pub files: Vec<SourceFile>,
    pub index: DeclarationIndex,
    pub graph: DependencyGraph,
    pub resolutions: BTreeMap<PathBuf, Resolution>,
    pub failures: Vec<ParseFailure>,
    pub stats: IndexStats,

    /// Raw file contents as read during the build
    sources: BTreeMap<PathBuf, String>,
}

impl ProjectGraph {
    /// Raw content of a parsed file
    pub fn source(&self, path: &Path) -> Option<&str> {
        self.sources.get(path).map(String::as_str)
    }
}

/// Runs discovery, resolution and chunking for one project root
pub struct ProjectIndexer {
    root: PathBuf,
    config: IndexerConfig,
    chunker: Chunker,
}

impl ProjectIndexer {
    pub async fn new(root: impl AsRef<Path>, config: IndexerConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let meta = tokio::fs::metadata(&root).await.map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", root.display()))
        })?;
        if !meta.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        config.validate().map_err(IndexerError::InvalidConfig)?;
        let chunker = Chunker::new(config.chunker.clone())?;

        Ok(Self {
            root,
            config,
            chunker,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Module roots and source files, as absolute (root-joined) paths
    pub fn discover(&self) -> Result<ScanResult> {
        ModuleScanner::new(&self.root, self.config.scan.clone()).scan()
    }

    /// Discover, parse, index and resolve every source file
    pub async fn build(&self) -> Result<ProjectGraph> {
        let start = Instant::now();
        log::info!("Building dependency graph for {}", self.root.display());

        let scan = self.discover()?;
        let mut builder = GraphBuilder::new()?;
        let mut sources = BTreeMap::new();

        for path in &scan.files {
            let relative = self.relative_path(path);
            match read_source(path).await {
                Ok(text) => {
                    if builder.add_source(&relative, &text) {
                        sources.insert(relative, text);
                    }
                }
                Err(e) => builder.record_failure(&relative, e.to_string()),
            }
        }

        let resolved = builder.build();

        let mut stats = IndexStats::new();
        stats.modules = scan.modules.len();
        stats.files = scan.files.len();
        stats.declarations = resolved.index.len();
        stats.collisions = resolved.index.collisions().len();
        stats.parse_failures = resolved.failures.len();
        stats.edges = resolved.graph.edge_count();
        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        log::info!("Graph completed: {stats:?}");

        Ok(ProjectGraph {
            files: resolved.files,
            index: resolved.index,
            graph: resolved.graph,
            resolutions: resolved.resolutions,
            failures: resolved.failures,
            stats,
            sources,
        })
    }

    /// Pack every file of the graph, in path order, with its dependencies.
    /// Token counts are taken on the prepared (cleaned, unescaped) contents.
    pub fn chunks(
        &self,
        project_id: u64,
        project: &ProjectGraph,
        counter: &dyn TokenCounter,
    ) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();

        for path in project.graph.files() {
            let main = self.document(project, path)?;
            let dependencies = project
                .graph
                .dependencies(path)?
                .into_iter()
                .map(|dep| self.document(project, dep))
                .collect::<Result<Vec<_>>>()?;

            let packed = self.chunker.pack(project_id, &main, dependencies, counter);
            log::debug!("{}: {} chunks", main.path, packed.len());
            chunks.extend(packed);
        }

        log::info!(
            "Project {project_id}: {} chunks from {} files",
            chunks.len(),
            project.graph.file_count()
        );
        Ok(chunks)
    }

    /// Token total and size class over every discovered file
    pub async fn metadata(
        &self,
        project_id: impl Into<String>,
        counter: &dyn TokenCounter,
    ) -> Result<ProjectMetadata> {
        let scan = self.discover()?;
        Ok(self.measure(project_id.into(), &scan.files, counter).await)
    }

    /// Unreadable files are logged and left out, as in `build`
    async fn measure(
        &self,
        project_id: String,
        files: &[PathBuf],
        counter: &dyn TokenCounter,
    ) -> ProjectMetadata {
        let mut total_tokens = 0usize;
        let mut java_files = Vec::with_capacity(files.len());

        for path in files {
            let text = match read_source(path).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let prepared = self.chunker.prepare_content(&text);
            total_tokens = total_tokens.saturating_add(counter.count(&prepared));
            java_files.push(path_string(&self.relative_path(path)));
        }

        ProjectMetadata {
            project_id,
            total_tokens,
            project_size: self.config.sizes.classify(total_tokens),
            java_files,
        }
    }

    fn document(&self, project: &ProjectGraph, path: &Path) -> Result<SourceDocument> {
        let raw = project.source(path).ok_or_else(|| {
            IndexerError::InvalidPath(format!("No source loaded for {}", path.display()))
        })?;
        Ok(SourceDocument::new(
            path_string(path),
            self.chunker.prepare_content(raw),
        ))
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

/// Read a file, replacing invalid UTF-8 instead of failing
async fn read_source(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Path with forward slashes, as written into records
pub fn path_string(path: &Path) -> String {
    let mut normalized = path.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use depchunk_chunker::HeuristicCounter;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IndexerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_size_thresholds_are_rejected() {
        let config = IndexerConfig {
            sizes: SizeThresholds {
                small_max: 30_000,
                medium_max: 20_000,
            },
            ..IndexerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("small_max"));
    }

    #[tokio::test]
    async fn test_measure_skips_unreadable_files() {
        let temp = tempfile::tempdir().unwrap();
        let present = temp.path().join("A.java");
        std::fs::write(&present, "class A {}").unwrap();
        let gone = temp.path().join("Gone.java");

        let indexer = ProjectIndexer::new(temp.path(), IndexerConfig::default())
            .await
            .unwrap();
        let metadata = indexer
            .measure("p".to_string(), &[gone, present], &HeuristicCounter)
            .await;

        assert_eq!(metadata.java_files, vec!["A.java".to_string()]);
        assert!(metadata.total_tokens > 0);
    }

    #[test]
    fn test_path_string_uses_forward_slashes() {
        assert_eq!(path_string(Path::new("a/b/C.java")), "a/b/C.java");
    }
}
