use crate::config::DepchunkConfig;
use anyhow::{Context, Result};
use depchunk_chunker::TokenCounter;
use depchunk_indexer::{discover_projects, project_name, ProjectIndexer};
use depchunk_protocol::jsonl::write_records;
use depchunk_protocol::{ProjectMetadata, ProjectSize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Metadata for every project directory under `projects_dir`, in name order
pub async fn collect_metadata(
    projects_dir: &Path,
    config: &DepchunkConfig,
    counter: &dyn TokenCounter,
) -> Result<Vec<ProjectMetadata>> {
    let mut metadata = Vec::new();

    for project in discover_projects(projects_dir).await? {
        let name = project_name(&project);
        let indexer = ProjectIndexer::new(&project, config.indexer_config()).await?;
        let entry = indexer
            .metadata(name.clone(), counter)
            .await
            .with_context(|| format!("Failed to measure project {name}"))?;

        log::info!(
            "{name}: {} files, {} tokens ({})",
            entry.java_files.len(),
            entry.total_tokens,
            entry.project_size.as_str()
        );
        metadata.push(entry);
    }

    Ok(metadata)
}

/// Totals of one `chunks` run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitSummary {
    pub projects: usize,
    pub skipped: usize,
    pub records: usize,
}

/// Appends chunk records to one JSONL file per size class
pub struct ChunkEmitter {
    out_dir: PathBuf,
    writers: HashMap<ProjectSize, BufWriter<File>>,
}

impl ChunkEmitter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        Ok(Self {
            out_dir,
            writers: HashMap::new(),
        })
    }

    fn writer(&mut self, size: ProjectSize) -> Result<&mut BufWriter<File>> {
        if !self.writers.contains_key(&size) {
            let path = self.out_dir.join(size.jsonl_file_name());
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            self.writers.insert(size, BufWriter::new(file));
        }
        self.writers
            .get_mut(&size)
            .context("size class writer missing")
    }

    /// Build, pack and append every project listed in `metadata`. Project ids
    /// are assigned sequentially from `first_id`; a project whose directory is
    /// missing is skipped and does not consume an id.
    pub async fn emit(
        &mut self,
        projects_dir: &Path,
        metadata: &[ProjectMetadata],
        first_id: u64,
        config: &DepchunkConfig,
        counter: &dyn TokenCounter,
    ) -> Result<EmitSummary> {
        let mut summary = EmitSummary::default();
        let mut project_id = first_id;
        let escape = config.chunker.escape_newlines;

        for entry in metadata {
            let root = projects_dir.join(&entry.project_id);
            if !root.is_dir() {
                log::warn!("Skipping {}: no directory at {}", entry.project_id, root.display());
                summary.skipped += 1;
                continue;
            }

            let indexer = ProjectIndexer::new(&root, config.indexer_config()).await?;
            let project = indexer
                .build()
                .await
                .with_context(|| format!("Failed to build graph for {}", entry.project_id))?;
            let chunks = indexer.chunks(project_id, &project, counter)?;
            let records: Vec<_> = chunks.iter().map(|chunk| chunk.to_record(escape)).collect();

            let writer = self.writer(entry.project_size)?;
            let written = write_records(writer, &records)?;

            log::info!(
                "Project {project_id} ({}): {written} records -> {}",
                entry.project_id,
                entry.project_size.jsonl_file_name()
            );
            summary.projects += 1;
            summary.records += written;
            project_id += 1;
        }

        Ok(summary)
    }

    /// Flush every open size-class file; returns their paths, smallest class first
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for size in ProjectSize::ALL {
            if let Some(writer) = self.writers.get_mut(&size) {
                writer.flush()?;
                written.push(self.out_dir.join(size.jsonl_file_name()));
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn finish_lists_opened_files_smallest_first() {
        let temp = tempdir().unwrap();
        let mut emitter = ChunkEmitter::new(temp.path()).unwrap();
        writeln!(emitter.writer(ProjectSize::Large).unwrap(), "{{}}").unwrap();
        writeln!(emitter.writer(ProjectSize::Small).unwrap(), "{{}}").unwrap();

        let written = emitter.finish().unwrap();

        assert_eq!(
            written,
            vec![temp.path().join("small.jsonl"), temp.path().join("large.jsonl")]
        );
        assert!(!temp.path().join("medium.jsonl").exists());
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "{}\n");
    }
}
