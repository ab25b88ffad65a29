use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn articles_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("articles");
    path
}

const SEED: &str = r#"[
    {"title": "Hello World", "content": "First article"},
    {"title": "Second Post", "content": "Zweiter Beitrag über Zürich"},
    {"title": "Third", "content": "Last one"}
]"#;

fn setup_test_env(backend: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(root.join("seed.json"), SEED).unwrap();

    let config_content = format!(
        r#"[store]
backend = "{}"
data_file = "{}/data/articles.json"
seed_file = "{}/seed.json"

[db]
min_connections = 1
max_connections = 2

[server]
bind = "127.0.0.1:0"
"#,
        backend,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("articles.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn database_url(tmp: &TempDir) -> String {
    format!("sqlite:{}", tmp.path().join("articles.sqlite").display())
}

fn run_articles(config_path: &Path, db_url: Option<&str>, args: &[&str]) -> (String, String, bool) {
    let binary = articles_binary();
    let mut cmd = Command::new(&binary);
    cmd.arg("--config").arg(config_path).args(args);
    match db_url {
        Some(url) => cmd.env("DATABASE_URL", url),
        None => cmd.env_remove("DATABASE_URL"),
    };
    let output = cmd
        .output()
        .unwrap_or_else(|e| panic!("Failed to run articles binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env("database");
    let url = database_url(&tmp);

    let (stdout, stderr, success) = run_articles(&config_path, Some(&url), &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("articles.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (tmp, config_path) = setup_test_env("database");
    let url = database_url(&tmp);

    let (_, _, success1) = run_articles(&config_path, Some(&url), &["init"]);
    assert!(success1, "First init failed");
    let (_, _, success2) = run_articles(&config_path, Some(&url), &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_missing_database_url_refuses_to_start() {
    let (_tmp, config_path) = setup_test_env("database");

    // `serve` would block forever if it got as far as binding
    let (_, stderr, success) = run_articles(&config_path, None, &["serve"]);
    assert!(!success);
    assert!(
        stderr.contains("DATABASE_URL"),
        "expected credential error, got: {}",
        stderr
    );
}

#[test]
fn test_load_into_database() {
    let (tmp, config_path) = setup_test_env("database");
    let url = database_url(&tmp);

    let (stdout, stderr, success) = run_articles(&config_path, Some(&url), &["load"]);
    assert!(success, "load failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Loaded 3 articles"));

    // Loading again appends another copy
    let (stdout, _, _) = run_articles(&config_path, Some(&url), &["load"]);
    assert!(stdout.contains("Loaded 3 articles"));
}

#[test]
fn test_load_into_file_backend() {
    let (tmp, config_path) = setup_test_env("file");

    let (stdout, stderr, success) = run_articles(&config_path, None, &["load"]);
    assert!(success, "load failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Loaded 3 articles"));

    let written = fs::read_to_string(tmp.path().join("data").join("articles.json")).unwrap();
    assert!(written.contains("    {\n        \"title\": \"Hello World\""));
    assert!(written.contains("über Zürich"));
}

#[test]
fn test_load_missing_seed_file() {
    let (tmp, config_path) = setup_test_env("file");
    let missing = tmp.path().join("nope.json");

    let (_, stderr, success) = run_articles(
        &config_path,
        None,
        &["load", "--file", missing.to_str().unwrap()],
    );
    assert!(!success);
    assert!(stderr.contains("seed file not found"));
}

#[test]
fn test_scrub_removes_text_without_config() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("articles.json");
    fs::write(
        &file,
        r#"[{"title": "a", "content": "keep FOOTER"}, {"title": "b", "content": 7}]"#,
    )
    .unwrap();

    // No config file exists at the default path; scrub must not need one
    let output = Command::new(articles_binary())
        .args(["scrub", file.to_str().unwrap(), "--text", " FOOTER"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "scrub failed: {}", stdout);
    assert!(stdout.contains("Successfully removed"));

    let written = fs::read_to_string(&file).unwrap();
    assert!(written.contains("\"content\": \"keep\""));
    assert!(written.contains("\"content\": 7"));
}

#[test]
fn test_scrub_missing_file_reports_diagnostic() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("absent.json");

    let output = Command::new(articles_binary())
        .args(["scrub", file.to_str().unwrap()])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("File not found"));
    assert!(!stderr.contains("panicked"));
}
