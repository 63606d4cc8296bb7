use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

use serde_json::Value;

const WHEELS: &str = "00,01\n01,02\n";

/// Scratch directory holding dumps under their default file names.
struct DumpDir {
    path: PathBuf,
}

impl DumpDir {
    fn new(name: &str, redirects: &str) -> Self {
        let path = std::env::temp_dir().join(format!("item-wheel-cli-{name}-{}", std::process::id()));
        fs::create_dir_all(&path).expect("create scratch directory");
        fs::write(path.join("itemWheel.dmp"), WHEELS).expect("write wheel dump");
        fs::write(path.join("wheelindexRedirect.dmp"), redirects).expect("write redirect dump");
        Self { path }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_item-wheel"))
            .current_dir(&self.path)
            .env("RUST_LOG", "warn")
            .args(args)
            .output()
            .expect("failed to run item-wheel binary")
    }
}

impl Drop for DumpDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn alternating_redirects() -> String {
    "0\n1\n0\n".repeat(60)
}

#[test]
fn export_writes_every_state_to_json() {
    let dir = DumpDir::new("export", &alternating_redirects());

    let output = dir.run(&["export", "--out", "stats.json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = fs::read_to_string(dir.path.join("stats.json")).expect("export written");
    let export: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(export["layout"]["stride"], 30);

    let records = export["records"].as_array().expect("records array");
    assert_eq!(records.len(), 180);
    assert_eq!(records[0]["progress"], 0.0);
    assert_eq!(records[0]["position"], 0);
    assert_eq!(records[0]["item"], 0);
    assert_eq!(records[0]["count"], 2);
    for record in records {
        let expected = match record["item"].as_u64() {
            Some(0) => 2,
            Some(1) => 3,
            Some(2) => 1,
            other => panic!("unexpected item {other:?}"),
        };
        assert_eq!(record["count"], expected);
    }
    assert_eq!(records[179]["progress"], 2.5);
    assert_eq!(records[179]["position"], 9);
}

#[test]
fn parallel_stdout_export_matches_file_export() {
    let dir = DumpDir::new("parallel", &alternating_redirects());
    fs::rename(dir.path.join("itemWheel.dmp"), dir.path.join("wheels.dmp")).expect("rename");

    let sequential = dir.run(&["--wheels", "wheels.dmp", "export", "--out", "stats.json"]);
    assert!(sequential.status.success());
    let parallel = dir.run(&["--wheels", "wheels.dmp", "--parallel", "export"]);
    assert!(parallel.status.success());

    let from_file: Value =
        serde_json::from_str(&fs::read_to_string(dir.path.join("stats.json")).expect("read"))
            .expect("valid json");
    let from_stdout: Value = serde_json::from_slice(&parallel.stdout).expect("valid json");
    assert_eq!(from_file, from_stdout);
}

#[test]
fn lookup_prints_one_state() {
    let dir = DumpDir::new("lookup", &alternating_redirects());

    let output = dir.run(&["lookup", "--lap", "0", "--position", "1", "--halfway"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lookupIdx:   33"));
    assert!(stdout.contains("| Fireball              | 100.00 % |"));
    assert!(stdout.contains("| Missile               |  33.33 % |"));
}

#[test]
fn interior_blank_line_in_redirect_dump_fails() {
    let dir = DumpDir::new("blank", "0\n\n1\n");

    let output = dir.run(&["export"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("blank line inside dump"));
}

#[test]
fn oversized_layout_in_config_fails() {
    let dir = DumpDir::new("config", &alternating_redirects());
    fs::write(dir.path.join("item-wheel.toml"), "[layout]\nlap_count = 128\n").expect("write");

    let output = dir.run(&["export"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid [layout] section"));
    assert!(stderr.contains("lap_count = 128"));
}
