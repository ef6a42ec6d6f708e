use crate::error::{IndexerError, Result};
use std::path::{Path, PathBuf};

/// Immediate sub-directories of `dir`, sorted by name. Each one is a project.
pub async fn discover_projects(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| IndexerError::InvalidPath(format!("{}: {e}", dir.display())))?;

    let mut projects = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            projects.push(entry.path());
        }
    }
    projects.sort();

    log::info!("Found {} projects in {}", projects.len(), dir.display());
    Ok(projects)
}

/// Project id used in metadata: the directory name
pub fn project_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn lists_only_directories_in_name_order() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("beta")).unwrap();
        std::fs::create_dir(temp.path().join("alpha")).unwrap();
        std::fs::write(temp.path().join("metadata.json"), b"[]").unwrap();

        let projects = discover_projects(temp.path()).await.unwrap();
        let names: Vec<String> = projects.iter().map(|p| project_name(p)).collect();

        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let temp = tempdir().unwrap();
        let result = discover_projects(temp.path().join("nope")).await;
        assert!(matches!(result, Err(IndexerError::InvalidPath(_))));
    }
}
