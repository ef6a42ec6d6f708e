//! Newline-delimited chunk records: parsing, writing, and comparing runs.

use crate::{serialize_json, ChunkRecord};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;

/// Parse every non-empty line as a [`ChunkRecord`]
pub fn parse_records(text: &str) -> Result<Vec<ChunkRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("invalid record on line {}", idx + 1))
        })
        .collect()
}

/// Write records as compact JSON, one per line
pub fn write_records<'a, W: Write>(
    out: &mut W,
    records: impl IntoIterator<Item = &'a ChunkRecord>,
) -> Result<usize> {
    let mut written = 0usize;
    for record in records {
        let line = serialize_json(record)?;
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}

/// Group records by main file, keeping first-appearance order of main files
pub fn group_by_main_file(records: &[ChunkRecord]) -> Vec<(&str, Vec<&ChunkRecord>)> {
    let mut groups: Vec<(&str, Vec<&ChunkRecord>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = record.content.main_file_path.as_str();
        match positions.get(key) {
            Some(&pos) => groups[pos].1.push(record),
            None => {
                positions.insert(key, groups.len());
                groups.push((key, vec![record]));
            }
        }
    }

    groups
}

fn total_dependencies(records: &[&ChunkRecord]) -> usize {
    records.iter().map(|r| r.content.dependencies.len()).sum()
}

/// Records of `new` for every main file whose total dependency count differs
/// from `old` (a main file missing from `old` counts as zero dependencies).
pub fn changed_main_files<'a>(
    old: &[ChunkRecord],
    new: &'a [ChunkRecord],
) -> Vec<&'a ChunkRecord> {
    let old_counts: HashMap<&str, usize> = group_by_main_file(old)
        .into_iter()
        .map(|(path, records)| (path, total_dependencies(&records)))
        .collect();

    group_by_main_file(new)
        .into_iter()
        .filter(|(path, records)| {
            old_counts.get(path).copied().unwrap_or(0) != total_dependencies(records)
        })
        .flat_map(|(_, records)| records)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkContent, DependencyRecord};
    use pretty_assertions::assert_eq;

    fn record(main: &str, chunk_id: usize, deps: &[&str]) -> ChunkRecord {
        ChunkRecord {
            project_id: 0,
            chunk_id,
            content: ChunkContent {
                main_file_path: main.to_string(),
                main_file_content: String::new(),
                dependencies: deps
                    .iter()
                    .map(|d| DependencyRecord {
                        file_path: d.to_string(),
                        file_content: String::new(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn records_survive_write_then_parse() {
        let records = vec![record("A.java", 0, &["B.java"]), record("A.java", 1, &["C.java"])];
        let mut out = Vec::new();
        assert_eq!(write_records(&mut out, &records).unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(parse_records(&text).unwrap(), records);
    }

    #[test]
    fn parse_reports_bad_line_number() {
        let err = parse_records("\n{not json}\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn diff_keeps_only_main_files_with_changed_dependency_counts() {
        let old = vec![
            record("A.java", 0, &["B.java"]),
            record("C.java", 0, &["D.java"]),
        ];
        let new = vec![
            record("A.java", 0, &["B.java"]),
            record("C.java", 0, &["D.java"]),
            record("C.java", 1, &["E.java"]),
            record("F.java", 0, &[]),
            record("G.java", 0, &["A.java"]),
        ];

        let changed: Vec<(String, usize)> = changed_main_files(&old, &new)
            .into_iter()
            .map(|r| (r.content.main_file_path.clone(), r.chunk_id))
            .collect();

        assert_eq!(
            changed,
            vec![
                ("C.java".to_string(), 0),
                ("C.java".to_string(), 1),
                ("G.java".to_string(), 0),
            ]
        );
    }
}
