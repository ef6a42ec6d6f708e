use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn depchunk() -> Command {
    let mut cmd = Command::cargo_bin("depchunk").expect("binary");
    cmd.arg("--quiet");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn shop_project(root: &Path) {
    write(root, "pom.xml", "<project/>");
    write(
        root,
        "src/main/java/p/A.java",
        "package p;\nimport p.sub.*;\n\npublic class A {\n    B b = new B();\n}\n",
    );
    write(
        root,
        "src/main/java/p/sub/B.java",
        "package p.sub;\n\npublic class B {\n    // nothing yet\n}\n",
    );
}

fn read_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}

#[test]
fn graph_prints_adjacency_json() {
    let temp = tempdir().unwrap();
    shop_project(temp.path());

    let output = depchunk()
        .arg("graph")
        .arg(temp.path())
        .arg("--edges")
        .output()
        .expect("run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(
        report["files"]["src/main/java/p/A.java"],
        serde_json::json!(["src/main/java/p/sub/B.java"])
    );
    assert_eq!(report["files"]["src/main/java/p/sub/B.java"], serde_json::json!([]));
    assert_eq!(report["edges"][0]["phase"], "wildcard_import");
    assert_eq!(report["stats"]["modules"], 1);
    assert_eq!(report["phases"]["wildcard_import"], 1);
    assert_eq!(report["phases"]["suffix_match"], 0);
}

#[test]
fn metadata_then_chunks_writes_size_class_files() {
    let temp = tempdir().unwrap();
    let projects = temp.path().join("projects");
    shop_project(&projects.join("alpha"));
    shop_project(&projects.join("beta"));
    let out = temp.path().join("out");
    let metadata = temp.path().join("metadata.json");

    depchunk()
        .arg("metadata")
        .arg(&projects)
        .arg("-o")
        .arg(&metadata)
        .assert()
        .success();

    let listed: Value = serde_json::from_str(&fs::read_to_string(&metadata).unwrap()).unwrap();
    assert_eq!(listed[0]["project_id"], "alpha");
    assert_eq!(listed[1]["project_id"], "beta");
    assert_eq!(listed[0]["project_size"], "small");

    // a listed project that no longer exists does not consume an id
    let mut entries = listed.as_array().unwrap().clone();
    let mut ghost = entries[0].clone();
    ghost["project_id"] = Value::from("ghost");
    entries.insert(0, ghost);
    fs::write(&metadata, serde_json::to_string(&entries).unwrap()).unwrap();

    depchunk()
        .arg("chunks")
        .arg(&projects)
        .arg("--metadata")
        .arg(&metadata)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    assert!(!out.join("medium.jsonl").exists());
    let records = read_lines(&out.join("small.jsonl"));
    assert_eq!(records.len(), 4);

    let ids: Vec<u64> = records.iter().map(|r| r["project_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0, 0, 1, 1]);

    let a = &records[0]["content"];
    assert_eq!(a["main_file_path"], "src/main/java/p/A.java");
    assert_eq!(a["dependencies"][0]["file_path"], "src/main/java/p/sub/B.java");
    let main = a["main_file_content"].as_str().unwrap();
    assert!(main.contains("\\n"));
    assert!(!main.contains('\n'));
    assert!(!a["dependencies"][0]["file_content"]
        .as_str()
        .unwrap()
        .contains("nothing yet"));
}

#[test]
fn diff_keeps_changed_main_files() {
    let temp = tempdir().unwrap();
    let old = temp.path().join("old.jsonl");
    let new = temp.path().join("new.jsonl");
    let out = temp.path().join("diff.jsonl");

    fs::write(
        &old,
        concat!(
            r#"{"project_id":0,"chunk_id":0,"content":{"main_file_path":"A.java","main_file_content":"a","dependencies":[]}}"#,
            "\n",
            r#"{"project_id":0,"chunk_id":0,"content":{"main_file_path":"B.java","main_file_content":"b","dependencies":[]}}"#,
            "\n"
        ),
    )
    .unwrap();
    fs::write(
        &new,
        concat!(
            r#"{"project_id":0,"chunk_id":0,"content":{"main_file_path":"A.java","main_file_content":"a","dependencies":[{"file_path":"B.java","file_content":"b"}]}}"#,
            "\n",
            r#"{"project_id":0,"chunk_id":0,"content":{"main_file_path":"B.java","main_file_content":"b","dependencies":[]}}"#,
            "\n"
        ),
    )
    .unwrap();

    depchunk()
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let records = read_lines(&out);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["content"]["main_file_path"], "A.java");
}

#[test]
fn schema_describes_chunk_record() {
    depchunk()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("main_file_path"));
}

#[test]
fn rejects_invalid_config() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("depchunk.toml");
    fs::write(&config, "[chunker]\ntoken_budget = 0\n").unwrap();

    depchunk()
        .arg("--config")
        .arg(&config)
        .arg("schema")
        .assert()
        .failure()
        .stderr(predicate::str::contains("token_budget"));
}

#[test]
fn missing_project_fails() {
    let temp = tempdir().unwrap();
    depchunk()
        .arg("graph")
        .arg(temp.path().join("missing"))
        .assert()
        .failure();
}
