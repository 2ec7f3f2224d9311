//! End-to-end integration tests for the export pipeline and query flow.
//!
//! Drives the real binary: extract → status → query, against a temp
//! directory layout described by a generated config file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

fn lh_binary() -> String {
    env!("CARGO_BIN_EXE_lh").to_string()
}

const EXPORT_DAY_ONE: &str = r#"{
    "timelineItems": [
        {
            "itemId": "v1",
            "startDate": "2019-02-22T07:00:00Z",
            "endDate": "2019-02-22T08:00:00Z",
            "isVisit": true,
            "place": {"name": "Home", "isHome": true}
        },
        {
            "itemId": "a1",
            "startDate": "2019-02-22T08:00:00Z",
            "endDate": "2019-02-22T08:30:00Z",
            "isVisit": false,
            "activityType": "cycling"
        },
        {
            "itemId": "v2",
            "startDate": "2019-02-22T08:30:00Z",
            "endDate": "2019-02-22T17:00:00Z",
            "isVisit": true,
            "place": {"name": "Office"}
        }
    ]
}"#;

const EXPORT_DAY_TWO: &str = r#"{
    "timelineItems": [
        {
            "itemId": "v3",
            "startDate": "2019-02-23T09:00:00Z",
            "endDate": "2019-02-23T11:00:00Z",
            "isVisit": true,
            "place": {"name": "Home", "isHome": true}
        }
    ]
}"#;

/// Lays out import dir (one plain file, one gzipped), classification file
/// and a config pointing at everything. Returns the config file path.
fn setup(temp: &Path) -> PathBuf {
    let import = temp.join("import");
    let extracted = temp.join("extracted");
    fs::create_dir_all(&import).unwrap();

    fs::write(import.join("2019-02-22.json"), EXPORT_DAY_ONE).unwrap();
    let gz = fs::File::create(import.join("2019-02-23.json.gz")).unwrap();
    let mut encoder = GzEncoder::new(gz, Compression::default());
    encoder.write_all(EXPORT_DAY_TWO.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let classification = temp.join("classifications.json");
    fs::write(&classification, r#"{"home": ["Home"]}"#).unwrap();

    let config_file = temp.join("config.toml");
    fs::write(
        &config_file,
        format!(
            "import_dir = {:?}\nextract_dir = {:?}\nclassification_path = {:?}\nauto_load_on_start = false\nlisten = \"127.0.0.1:0\"\n",
            import, extracted, classification
        ),
    )
    .unwrap();
    config_file
}

fn run_lh(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(lh_binary())
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run lh")
}

#[test]
fn test_extract_then_query_flow() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    // Extract: one copy, one gunzip
    let output = run_lh(&config, &["extract"]);
    assert!(
        output.status.success(),
        "extract failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("extract summary should be JSON");
    assert_eq!(summary["copied"], 1);
    assert_eq!(summary["extracted"], 1);
    assert!(temp.path().join("extracted/2019-02-22.json").exists());
    assert!(temp.path().join("extracted/2019-02-23.json").exists());

    // Status over the extracted layer
    let output = run_lh(&config, &["status"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Timelines:       2"), "stdout: {stdout}");
    assert!(stdout.contains("Timeline items:  4"), "stdout: {stdout}");

    // Places dedup across both days
    let output = run_lh(&config, &["places"]);
    assert!(output.status.success());
    let places: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(places, ["Home", "Office"]);

    // Classification-based filtering
    let output = run_lh(&config, &["places", "--filter", "placeClass=home"]);
    let places: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(places, ["Home"]);

    // Activity types
    let output = run_lh(&config, &["activity-types"]);
    let kinds: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(kinds, ["cycling"]);
}

#[test]
fn test_second_extract_run_skips_everything() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    run_lh(&config, &["extract"]);
    let output = run_lh(&config, &["extract"]);
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["skipped"], 2);
    assert_eq!(summary["copied"], 0);
    assert_eq!(summary["extracted"], 0);
}

#[test]
fn test_invalid_filter_fails_with_field_name() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());
    run_lh(&config, &["extract"]);

    let output = run_lh(&config, &["places", "--filter", "from=whenever"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("from"), "stderr: {stderr}");
}

#[test]
fn test_status_without_extracted_layer_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let config = setup(temp.path());

    // No extract run yet, so the extracted dir does not exist
    let output = run_lh(&config, &["status"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("extracted"), "stderr: {stderr}");
}
