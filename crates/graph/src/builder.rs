use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::index::DeclarationIndex;
use crate::resolver::{DependencyResolver, Resolution};
use crate::syntax::JavaSyntax;
use crate::types::{ParseFailure, SourceFile};
use crate::usage::UsageRecord;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything known about one project after resolution
#[derive(Debug, Clone, Default)]
pub struct ResolvedProject {
    /// Successfully parsed files, sorted by path string
    pub files: Vec<SourceFile>,
    pub index: DeclarationIndex,
    pub graph: DependencyGraph,

    /// Per-file resolution detail (which phase covered which name)
    pub resolutions: BTreeMap<PathBuf, Resolution>,
    pub failures: Vec<ParseFailure>,
}

/// Collects parsed files, then resolves them all against one shared index
pub struct GraphBuilder {
    syntax: JavaSyntax,
    parsed: Vec<(SourceFile, UsageRecord)>,
    failures: Vec<ParseFailure>,
}

impl GraphBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            syntax: JavaSyntax::new()?,
            parsed: Vec::new(),
            failures: Vec::new(),
        })
    }

    /// Parse one file. On a syntax error the file is recorded as a failure
    /// and left out of the index and the graph; returns whether it parsed.
    pub fn add_source(&mut self, path: impl AsRef<Path>, source: &str) -> bool {
        let path = path.as_ref();
        match self.syntax.parse(source) {
            Ok(unit) => {
                let file = SourceFile::new(path, unit.package(), unit.declared_types());
                let usage = UsageRecord::extract(&unit);
                log::debug!(
                    "Parsed {} ({} types, {} names)",
                    path.display(),
                    file.declared_types.len(),
                    usage.simple_names.len()
                );
                self.parsed.push((file, usage));
                true
            }
            Err(e) => {
                self.record_failure(path, e.to_string());
                false
            }
        }
    }

    /// Record a file that could not be read or parsed
    pub fn record_failure(&mut self, path: impl AsRef<Path>, message: impl Into<String>) {
        let failure = ParseFailure::new(path, message);
        log::warn!("Skipping {}: {}", failure.path.display(), failure.message);
        self.failures.push(failure);
    }

    pub fn build(mut self) -> ResolvedProject {
        // String order decides which file wins an FQN collision
        self.parsed
            .sort_by_cached_key(|(file, _)| file.path.to_string_lossy().into_owned());
        self.failures
            .sort_by_cached_key(|failure| failure.path.to_string_lossy().into_owned());

        // The index must be complete before any file is resolved
        let mut index_builder = DeclarationIndex::builder();
        for (file, _) in &self.parsed {
            index_builder.add_file(file);
        }
        let index = index_builder.build();

        let mut graph = DependencyGraph::new();
        let mut resolutions = BTreeMap::new();
        {
            let resolver = DependencyResolver::new(&index);
            for (file, usage) in &self.parsed {
                graph.add_file(&file.path);
                let resolution = resolver.resolve(file, usage);
                for (target, phase) in &resolution.edge_phases {
                    graph.add_edge(&file.path, target, *phase);
                }
                resolutions.insert(file.path.clone(), resolution);
            }
        }

        log::info!(
            "Resolved {} files: {} declarations, {} edges, {} parse failures",
            self.parsed.len(),
            index.len(),
            graph.edge_count(),
            self.failures.len()
        );

        ResolvedProject {
            files: self.parsed.into_iter().map(|(file, _)| file).collect(),
            index,
            graph,
            resolutions,
            failures: self.failures,
        }
    }
}
