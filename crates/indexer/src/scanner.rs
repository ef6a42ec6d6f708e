use crate::error::{IndexerError, Result};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// What counts as a module and where its sources live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// File names whose presence makes a directory a module root
    pub manifest_markers: Vec<String>,

    /// Source sub-trees scanned inside each module, relative to the module root
    pub source_roots: Vec<PathBuf>,

    /// Source file extension, without the dot
    pub extension: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            manifest_markers: vec![
                "pom.xml".to_string(),
                "build.gradle".to_string(),
                "build.gradle.kts".to_string(),
            ],
            source_roots: vec![
                PathBuf::from("src/main/java"),
                PathBuf::from("src/test/java"),
            ],
            extension: "java".to_string(),
        }
    }
}

impl ScanOptions {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.manifest_markers.is_empty() {
            return Err("manifest_markers must not be empty".to_string());
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(format!("invalid source extension {:?}", self.extension));
        }
        Ok(())
    }
}

/// Discovered modules and source files, unique and sorted by path string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub modules: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// Finds module roots under a project and enumerates their source files
pub struct ModuleScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl ModuleScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Directories containing a manifest marker, sorted
    pub fn find_modules(&self) -> Result<Vec<PathBuf>> {
        self.check_root()?;

        let mut modules = BTreeSet::new();
        for path in self.walk(&self.root)? {
            let is_marker = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| self.options.manifest_markers.iter().any(|m| m == name));
            if is_marker {
                if let Some(parent) = path.parent() {
                    modules.insert(parent.to_path_buf());
                }
            }
        }
        Ok(lexicographic(modules))
    }

    /// Scan the project. With modules, each module contributes its source
    /// roots (or its whole tree when it has none); without modules the
    /// whole project is scanned once.
    pub fn scan(&self) -> Result<ScanResult> {
        let modules = self.find_modules()?;
        let mut files = BTreeSet::new();

        if modules.is_empty() {
            log::debug!("No modules under {}, scanning whole tree", self.root.display());
            self.collect_sources(&self.root, &mut files)?;
        }

        for module in &modules {
            let roots: Vec<PathBuf> = self
                .options
                .source_roots
                .iter()
                .map(|sub| module.join(sub))
                .filter(|dir| dir.is_dir())
                .collect();

            if roots.is_empty() {
                log::debug!("Module {} has no source roots, scanning it whole", module.display());
                self.collect_sources(module, &mut files)?;
            }
            for dir in roots {
                self.collect_sources(&dir, &mut files)?;
            }
        }

        log::info!(
            "Found {} source files in {} modules under {}",
            files.len(),
            modules.len(),
            self.root.display()
        );

        Ok(ScanResult {
            modules,
            files: lexicographic(files),
        })
    }

    fn check_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                self.root.display()
            )));
        }
        Ok(())
    }

    fn collect_sources(&self, dir: &Path, files: &mut BTreeSet<PathBuf>) -> Result<()> {
        for path in self.walk(dir)? {
            if self.is_source_file(&path) {
                files.insert(path);
            }
        }
        Ok(())
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.options.extension)
    }

    /// Every regular file under `dir`. Nothing is filtered: hidden files and
    /// ignore files are not consulted.
    fn walk(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut builder = WalkBuilder::new(dir);
        builder
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let mut paths = Vec::new();
        for result in builder.build() {
            let entry = result?;
            if entry.file_type().is_some_and(|ft| ft.is_file()) {
                paths.push(entry.into_path());
            }
        }
        Ok(paths)
    }
}

/// Paths ordered by their string form (`p-x/` sorts before `p/`), not by components
fn lexicographic(paths: BTreeSet<PathBuf>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = paths.into_iter().collect();
    paths.sort_by_cached_key(|path| path.to_string_lossy().into_owned());
    paths
}
