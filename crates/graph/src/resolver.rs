use crate::index::DeclarationIndex;
use crate::types::{qualify, ResolutionPhase, SourceFile};
use crate::usage::UsageRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// How one simple name was covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedName {
    pub phase: ResolutionPhase,

    /// Files the name resolved to; empty when it resolved to the source file itself
    pub targets: Vec<PathBuf>,
}

/// Outcome of resolving one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Sorted, de-duplicated dependency files (never the source file)
    pub dependencies: BTreeSet<PathBuf>,

    /// Simple name → phase and targets that covered it
    pub covered: BTreeMap<String, ResolvedName>,

    /// Target → first phase that produced an edge to it
    pub edge_phases: BTreeMap<PathBuf, ResolutionPhase>,
}

impl Resolution {
    pub fn is_covered(&self, name: &str) -> bool {
        self.covered.contains_key(name)
    }

    pub fn phase_of(&self, name: &str) -> Option<ResolutionPhase> {
        self.covered.get(name).map(|resolved| resolved.phase)
    }

    fn cover(&mut self, source: &Path, name: &str, phase: ResolutionPhase, targets: Vec<&Path>) {
        let mut kept = Vec::new();
        for target in targets {
            if target == source {
                continue;
            }
            self.dependencies.insert(target.to_path_buf());
            self.edge_phases.entry(target.to_path_buf()).or_insert(phase);
            kept.push(target.to_path_buf());
        }

        match self.covered.get_mut(name) {
            Some(resolved) => {
                for target in kept {
                    if !resolved.targets.contains(&target) {
                        resolved.targets.push(target);
                    }
                }
            }
            None => {
                self.covered.insert(
                    name.to_string(),
                    ResolvedName {
                        phase,
                        targets: kept,
                    },
                );
            }
        }
    }
}

/// Binds the simple names of a file to project files through four ordered phases:
/// explicit imports, wildcard imports, same package, then a suffix scan of the index.
pub struct DependencyResolver<'a> {
    index: &'a DeclarationIndex,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(index: &'a DeclarationIndex) -> Self {
        Self { index }
    }

    pub fn resolve(&self, file: &SourceFile, usage: &UsageRecord) -> Resolution {
        let mut resolution = Resolution::default();

        self.resolve_explicit_imports(file, usage, &mut resolution);
        self.resolve_wildcard_imports(file, usage, &mut resolution);
        self.resolve_same_package(file, usage, &mut resolution);
        self.resolve_by_suffix(file, usage, &mut resolution);

        resolution
    }

    fn resolve_explicit_imports(
        &self,
        file: &SourceFile,
        usage: &UsageRecord,
        resolution: &mut Resolution,
    ) {
        for fqn in &usage.fq_imports {
            let simple = fqn.rsplit('.').next().unwrap_or(fqn);
            if !usage.simple_names.contains(simple) {
                continue;
            }
            if let Some(target) = self.index.get(fqn) {
                resolution.cover(&file.path, simple, ResolutionPhase::ExplicitImport, vec![target]);
            }
        }
    }

    /// All wildcard hits are collected before any name is marked covered
    fn resolve_wildcard_imports(
        &self,
        file: &SourceFile,
        usage: &UsageRecord,
        resolution: &mut Resolution,
    ) {
        let mut hits: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();

        for name in uncovered(usage, resolution) {
            for package in &usage.wildcard_packages {
                if let Some(target) = self.index.get(&qualify(package, name)) {
                    hits.entry(name).or_default().push(target);
                }
            }
        }

        for (name, targets) in hits {
            if targets.len() > 1 {
                log::debug!(
                    "{}: `{name}` matches {} wildcard imports",
                    file.path.display(),
                    targets.len()
                );
            }
            resolution.cover(&file.path, name, ResolutionPhase::WildcardImport, targets);
        }
    }

    fn resolve_same_package(
        &self,
        file: &SourceFile,
        usage: &UsageRecord,
        resolution: &mut Resolution,
    ) {
        let hits: Vec<(&str, &Path)> = uncovered(usage, resolution)
            .filter_map(|name| {
                self.index
                    .get(&qualify(file.package_name(), name))
                    .map(|target| (name, target))
            })
            .collect();

        for (name, target) in hits {
            resolution.cover(&file.path, name, ResolutionPhase::SamePackage, vec![target]);
        }
    }

    /// Heuristic fallback: first index key (in key order) ending in `.Name`,
    /// skipping the source file itself
    fn resolve_by_suffix(
        &self,
        file: &SourceFile,
        usage: &UsageRecord,
        resolution: &mut Resolution,
    ) {
        let hits: Vec<(&str, &Path)> = uncovered(usage, resolution)
            .filter_map(|name| {
                let mut candidates = self
                    .index
                    .suffix_matches(name)
                    .filter(|(_, path)| *path != file.path.as_path());
                let (fqn, target) = candidates.next()?;
                if candidates.next().is_some() {
                    log::debug!(
                        "{}: `{name}` is ambiguous, picked {fqn}",
                        file.path.display()
                    );
                }
                Some((name, target))
            })
            .collect();

        for (name, target) in hits {
            resolution.cover(&file.path, name, ResolutionPhase::SuffixMatch, vec![target]);
        }
    }
}

fn uncovered<'u>(
    usage: &'u UsageRecord,
    resolution: &Resolution,
) -> impl Iterator<Item = &'u str> + 'u {
    let covered: BTreeSet<String> = resolution.covered.keys().cloned().collect();
    usage
        .simple_names
        .iter()
        .filter(move |name| !covered.contains(*name))
        .map(String::as_str)
}
