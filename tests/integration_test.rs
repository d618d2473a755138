//! Integration tests for the fixtrace CLI
//!
//! These tests build a small git repository in a temp directory and run the
//! actual binary against it to verify:
//! - CSV output columns, labels and previous-commit resolution
//! - JSON output on stdout
//! - Default output naming next to the repository
//! - Failure on paths that are not repositories

use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const HEADER: &str = "File,Commit,Author,Commit Message,Start Line,End Line,Previous Author,\
                      Previous Commit,Keyword Label,Commit Date,Previous Commit Date";

/// Commit the whole working tree on HEAD.
fn commit_all(repo: &Repository, message: &str, author: &str, secs: i64) -> Oid {
    let mut index = repo.index().expect("index");
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .expect("stage files");
    index.write().expect("write index");
    let tree = repo
        .find_tree(index.write_tree().expect("write tree"))
        .expect("find tree");

    let email = format!("{}@example.com", author.to_lowercase());
    let sig = Signature::new(author, &email, &Time::new(secs, 0)).expect("signature");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("commit")
}

fn numbered(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{} {}\n", prefix, n)).collect()
}

/// A repository where "add module" (Alice) creates 20 lines and
/// "fix null pointer" (Bob) rewrites lines 10-12.
fn create_fix_repo() -> (TempDir, PathBuf, Oid, Oid) {
    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let root = workspace.path().join("project");
    std::fs::create_dir_all(root.join("src")).expect("create src");
    let repo = Repository::init(&root).expect("init repo");

    let mut lines = numbered("let value =", 20);
    std::fs::write(root.join("src/module.rs"), lines.join("")).expect("write module");
    std::fs::write(root.join("README.md"), "# project\n").expect("write readme");
    let c1 = commit_all(&repo, "add module", "Alice", 1_700_000_000);

    for line in &mut lines[9..12] {
        *line = line.replace("let value", "let checked");
    }
    std::fs::write(root.join("src/module.rs"), lines.join("")).expect("write module");
    let c2 = commit_all(&repo, "fix null pointer", "Bob", 1_700_086_400);

    (workspace, root, c1, c2)
}

/// Run fixtrace with `args` from `cwd`; returns (stdout, stderr, exit_code)
fn run_fixtrace(cwd: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_fixtrace"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("FIXTRACE_CONFIG")
        .output()
        .expect("Failed to execute fixtrace binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn short(id: Oid) -> String {
    id.to_string()[..7].to_string()
}

#[test]
fn test_csv_output_to_file() {
    let (workspace, root, c1, c2) = create_fix_repo();
    let out = workspace.path().join("out.csv");

    let (_, stderr, code) = run_fixtrace(
        workspace.path(),
        &[
            root.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--no-progress",
        ],
    );
    assert_eq!(code, 0, "fixtrace failed: {}", stderr);
    assert!(stderr.contains("Saved 3 records"), "stderr: {}", stderr);

    let csv = std::fs::read_to_string(&out).expect("read output");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.len(), 4);

    assert_eq!(
        lines[1],
        format!(
            "src/module.rs,{},Alice,add module,1,9,,,0,2023-11-14 22:13:20,",
            short(c1)
        )
    );
    assert_eq!(
        lines[2],
        format!(
            "src/module.rs,{},Bob,fix null pointer,10,12,Alice,{},1,2023-11-15 22:13:20,2023-11-14 22:13:20",
            short(c2),
            short(c1)
        )
    );
    assert!(lines[3].starts_with(&format!("src/module.rs,{},Alice,add module,13,20,", short(c1))));
    assert!(!csv.contains("README.md"));
}

#[test]
fn test_json_output_on_stdout() {
    let (workspace, root, c1, c2) = create_fix_repo();

    let (stdout, stderr, code) = run_fixtrace(
        workspace.path(),
        &[
            "mine",
            root.to_str().unwrap(),
            "--format",
            "json",
            "-o",
            "-",
            "--full-hash",
            "--no-progress",
        ],
    );
    assert_eq!(code, 0, "fixtrace failed: {}", stderr);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON on stdout");
    let records = parsed.as_array().expect("records array");
    assert_eq!(records.len(), 3);

    let fix = records
        .iter()
        .find(|r| r["Commit"] == c2.to_string().as_str())
        .expect("fix record");
    assert_eq!(fix["Keyword Label"], 1);
    assert_eq!(fix["Previous Commit"], c1.to_string().as_str());
    assert_eq!(fix["Previous Author"], "Alice");
    assert_eq!(fix["Start Line"], 10);
    assert_eq!(fix["End Line"], 12);

    let base = records
        .iter()
        .find(|r| r["Start Line"] == 1)
        .expect("base record");
    assert!(base["Previous Commit"].is_null());
    assert_eq!(base["Keyword Label"], 0);
}

#[test]
fn test_default_output_next_to_repo() {
    let (workspace, root, _, _) = create_fix_repo();

    let (_, stderr, code) = run_fixtrace(
        workspace.path(),
        &[root.to_str().unwrap(), "--window", "1", "--no-progress"],
    );
    assert_eq!(code, 0, "fixtrace failed: {}", stderr);

    let out = workspace.path().join("project_blame_data.csv");
    let csv = std::fs::read_to_string(&out).expect("default output file");
    assert!(csv.starts_with(HEADER));
    // window of one entry never reaches an ancestor
    for line in csv.lines().skip(1) {
        assert!(line.ends_with(','), "unexpected previous commit: {}", line);
    }
}

#[test]
fn test_config_file_is_applied() {
    let (workspace, root, _, _) = create_fix_repo();
    std::fs::write(
        workspace.path().join("fixtrace.toml"),
        "keywords = [\"module\"]\n",
    )
    .expect("write config");

    let (stdout, stderr, code) = run_fixtrace(
        workspace.path(),
        &[root.to_str().unwrap(), "--format", "json", "-o", "-", "--no-progress"],
    );
    assert_eq!(code, 0, "fixtrace failed: {}", stderr);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    for record in parsed.as_array().expect("records array") {
        let expected = if record["Commit Message"] == "add module" { 1 } else { 0 };
        assert_eq!(record["Keyword Label"], expected);
    }
}

#[test]
fn test_not_a_repository_fails() {
    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let plain = workspace.path().join("plain");
    std::fs::create_dir_all(&plain).expect("create dir");

    let (_, stderr, code) = run_fixtrace(
        workspace.path(),
        &[plain.to_str().unwrap(), "-o", "-", "--no-progress"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to mine"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_window_rejected() {
    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let (_, stderr, code) = run_fixtrace(workspace.path(), &[".", "--window", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("window must be at least 1"), "stderr: {}", stderr);
}

#[test]
fn test_init_writes_config() {
    let workspace = tempfile::tempdir().expect("Failed to create temp dir");
    let (stdout, stderr, code) = run_fixtrace(workspace.path(), &["init"]);
    assert_eq!(code, 0, "init failed: {}", stderr);
    assert!(stdout.contains("Created"));

    let config = std::fs::read_to_string(workspace.path().join("fixtrace.toml"))
        .expect("config written");
    assert!(config.contains("window = 50"));
}
