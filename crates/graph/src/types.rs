use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A parsed source file: its package and the top-level types it declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File path as discovered (absolute or root-joined)
    pub path: PathBuf,

    /// Declared package, `None` for the default package
    pub package: Option<String>,

    /// Top-level type names (e.g., "OrderService")
    pub declared_types: Vec<String>,
}

impl SourceFile {
    pub fn new(
        path: impl Into<PathBuf>,
        package: Option<String>,
        declared_types: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            package,
            declared_types,
        }
    }

    /// Package as a string, empty for the default package
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }

    /// Fully-qualified names of every declared type
    pub fn fqns(&self) -> impl Iterator<Item = String> + '_ {
        self.declared_types
            .iter()
            .map(move |name| qualify(self.package_name(), name))
    }
}

/// `package.Name`, or bare `Name` when the package is empty
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// How a simple name was bound to a file. Phases run in declaration order;
/// a name covered by an earlier phase is never looked at again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPhase {
    /// `import a.b.Name;`
    ExplicitImport,

    /// `import a.b.*;`
    WildcardImport,

    /// Declared in the same package as the referencing file
    SamePackage,

    /// First index key ending in `.Name` (heuristic)
    SuffixMatch,
}

impl ResolutionPhase {
    pub const ALL: [ResolutionPhase; 4] = [
        Self::ExplicitImport,
        Self::WildcardImport,
        Self::SamePackage,
        Self::SuffixMatch,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExplicitImport => "explicit_import",
            Self::WildcardImport => "wildcard_import",
            Self::SamePackage => "same_package",
            Self::SuffixMatch => "suffix_match",
        }
    }
}

impl fmt::Display for ResolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two distinct files
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: PathBuf,
    pub target: PathBuf,
    pub phase: ResolutionPhase,
}

/// A file that could not be parsed and was left out of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub message: String,
}

impl ParseFailure {
    pub fn new(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}
