use crate::types::SourceFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Two files declared the same fully-qualified name; only `kept` is reachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FqnCollision {
    pub fqn: String,
    pub kept: PathBuf,
    pub shadowed: PathBuf,
}

/// Fully-qualified type name → declaring file.
///
/// Built once per project and read-only afterwards. Keys iterate in
/// lexicographic order, which makes suffix lookups reproducible.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    entries: BTreeMap<String, PathBuf>,
    collisions: Vec<FqnCollision>,
}

impl DeclarationIndex {
    pub fn builder() -> DeclarationIndexBuilder {
        DeclarationIndexBuilder::default()
    }

    pub fn get(&self, fqn: &str) -> Option<&Path> {
        self.entries.get(fqn).map(PathBuf::as_path)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.entries.contains_key(fqn)
    }

    /// All entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(fqn, path)| (fqn.as_str(), path.as_path()))
    }

    /// Entries whose key ends in `.name`, in key order
    pub fn suffix_matches<'a>(&'a self, name: &str) -> impl Iterator<Item = (&'a str, &'a Path)> {
        let suffix = format!(".{name}");
        self.iter().filter(move |(fqn, _)| fqn.ends_with(&suffix))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declarations that were shadowed by a later file
    pub fn collisions(&self) -> &[FqnCollision] {
        &self.collisions
    }
}

#[derive(Debug, Default)]
pub struct DeclarationIndexBuilder {
    entries: BTreeMap<String, PathBuf>,
    collisions: Vec<FqnCollision>,
}

impl DeclarationIndexBuilder {
    /// Register every top-level type of a file. Files must be added in a
    /// deterministic order: on collision the later file wins.
    pub fn add_file(&mut self, file: &SourceFile) {
        for fqn in file.fqns() {
            self.insert(fqn, &file.path);
        }
    }

    pub fn insert(&mut self, fqn: String, path: &Path) {
        if let Some(previous) = self.entries.insert(fqn.clone(), path.to_path_buf()) {
            if previous != path {
                log::warn!(
                    "Duplicate declaration of {fqn}: {} shadows {}",
                    path.display(),
                    previous.display()
                );
                self.collisions.push(FqnCollision {
                    fqn,
                    kept: path.to_path_buf(),
                    shadowed: previous,
                });
            }
        }
    }

    pub fn build(self) -> DeclarationIndex {
        DeclarationIndex {
            entries: self.entries,
            collisions: self.collisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(path: &str, package: Option<&str>, types: &[&str]) -> SourceFile {
        SourceFile::new(
            path,
            package.map(str::to_string),
            types.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn keys_are_package_qualified_or_bare() {
        let mut builder = DeclarationIndex::builder();
        builder.add_file(&file("p/A.java", Some("p"), &["A", "AExtra"]));
        builder.add_file(&file("B.java", None, &["B"]));
        let index = builder.build();

        let keys: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "p.A", "p.AExtra"]);
        assert_eq!(index.get("p.AExtra"), Some(Path::new("p/A.java")));
        assert!(index.collisions().is_empty());
    }

    #[test]
    fn later_file_wins_collision_and_is_reported() {
        let mut builder = DeclarationIndex::builder();
        builder.add_file(&file("a/Dup.java", Some("p"), &["Dup"]));
        builder.add_file(&file("b/Dup.java", Some("p"), &["Dup"]));
        let index = builder.build();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("p.Dup"), Some(Path::new("b/Dup.java")));
        assert_eq!(
            index.collisions(),
            &[FqnCollision {
                fqn: "p.Dup".into(),
                kept: "b/Dup.java".into(),
                shadowed: "a/Dup.java".into(),
            }]
        );
    }

    #[test]
    fn suffix_matches_iterate_in_key_order() {
        let mut builder = DeclarationIndex::builder();
        builder.add_file(&file("z/Helper.java", Some("z.util"), &["Helper"]));
        builder.add_file(&file("a/Helper.java", Some("a.util"), &["Helper"]));
        builder.add_file(&file("a/MyHelper.java", Some("a"), &["MyHelper"]));
        let index = builder.build();

        let matches: Vec<&str> = index.suffix_matches("Helper").map(|(k, _)| k).collect();
        assert_eq!(matches, vec!["a.util.Helper", "z.util.Helper"]);
    }
}
