//! # Pipeline Tests: aggregate -> curate -> generate
//!
//! Drives both stages through the library entry points used by the
//! binaries, against temporary working directories.

use qh_core::{
    CurationSheet, DuplicatePolicy, OutputConfig, PipelineConfig, QhError, SourceLang, Status,
};
use qh_table::{discover_curation, run_aggregate, run_generate};
use std::path::{Path, PathBuf};
use std::time::Instant;

fn config_in(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.aggregate.output = dir.join("header_analysis.curation.json");
    config.output = OutputConfig {
        dir: dir.to_path_buf(),
        ..OutputConfig::default()
    };
    config
}

fn write_capture(dir: &Path, file: &str, body: &str) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, body).unwrap();
    path
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_end_to_end_generation() {
    let t = Instant::now();

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let captures = vec![
        write_capture(
            dir.path(),
            "chrome.json",
            r#"[
                {"type": "request", "name": "Accept-Encoding", "value": "gzip", "count": 5},
                {"type": "request", "name": "accept-encoding", "value": "(anonymized)", "count": 3},
                {"type": "request", "name": "cookie", "value": "(anonymized)", "count": 9},
                {"type": "response", "name": "server", "value": "nginx", "count": 4}
            ]"#,
        ),
        write_capture(
            dir.path(),
            "firefox.json",
            r#"[{"type": "response", "name": "Server", "value": "nginx", "count": 2}]"#,
        ),
    ];

    let sheet_path = run_aggregate(&config, &captures).unwrap();
    let mut sheet = CurationSheet::read(&sheet_path).unwrap();
    assert_eq!(sheet.request_names[0].name, "cookie");
    assert_eq!(sheet.request_names[1].count, Some(8));
    assert_eq!(sheet.response_complete[0].count, Some(6));

    // Curation: keep the gzip pair, drop the accept-encoding name.
    sheet.request_names[1].status = Some(Status::Drop("drop".into()));
    sheet.response_names[0].status = Some(Status::Drop("drop".into()));
    std::fs::write(&sheet_path, sheet.to_json().unwrap()).unwrap();

    let written = run_generate(&config, None, dir.path()).unwrap();
    assert_eq!(written.len(), 3);

    let md = std::fs::read_to_string(dir.path().join("headers.md")).unwrap();
    assert!(md.contains("**Slot usage: 2/255**"));
    assert!(md.contains("| 0x01 | Complete Pair | accept-encoding | gzip |"));
    assert!(md.contains("| 0x02 | Name Only | cookie | (variable) |"));
    assert!(md.contains("| 0x01 | Complete Pair | server | nginx |"));

    let json = std::fs::read_to_string(dir.path().join("headers.json")).unwrap();
    let table = qh_codec::StaticTable::from_interchange(&json).unwrap();
    assert_eq!(table.request.encode_pair("accept-encoding", "gzip"), Some(1));
    assert_eq!(table.response.slots_used(), 1);

    let rs = std::fs::read_to_string(dir.path().join("headers.rs")).unwrap();
    assert!(rs.contains("pub static RESPONSE_PAIR_ENCODE: [(&str, u8); 1] = ["));

    println!("test_end_to_end_generation: Testing Overhead = {:?}", t.elapsed());
}

/// Aggregator output goes straight into the builder with no Status column.
#[test]
fn test_uncurated_document_generates_directly() {
    let t = Instant::now();

    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let captures = vec![write_capture(
        dir.path(),
        "capture.json",
        r#"[
            {"type": "request", "name": "accept", "value": "*/*", "count": 9},
            {"type": "request", "name": "cookie", "value": "(anonymized)", "count": 6},
            {"type": "request", "name": "X-Empty", "value": "", "count": 4},
            {"type": "response", "name": "server", "value": "nginx", "count": 3}
        ]"#,
    )];

    run_aggregate(&config, &captures).unwrap();
    let written = run_generate(&config, None, dir.path()).unwrap();
    assert_eq!(written.len(), 3);

    let json = std::fs::read_to_string(dir.path().join("headers.json")).unwrap();
    let table = qh_codec::StaticTable::from_interchange(&json).unwrap();
    assert_eq!(table.request.slots_used(), 4);
    assert_eq!(table.request.encode_pair("accept", "*/*"), Some(1));
    assert_eq!(table.request.encode_name("accept"), Some(2));
    assert_eq!(table.request.encode_name("cookie"), Some(3));
    assert_eq!(table.request.encode_name("x-empty"), Some(4));
    assert_eq!(table.request.encode_pair("x-empty", ""), None);
    assert_eq!(table.response.encode_pair("server", "nginx"), Some(1));
    assert_eq!(table.response.encode_name("server"), Some(2));

    let md = std::fs::read_to_string(dir.path().join("headers.md")).unwrap();
    assert!(md.contains("| 0x04 | Name Only | x-empty | (variable) |"));

    println!("test_uncurated_document_generates_directly: Testing Overhead = {:?}", t.elapsed());
}

/// A failing build leaves the output directory untouched.
#[test]
fn test_failed_build_writes_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.table.duplicate_policy = DuplicatePolicy::Reject;
    let curated = write_capture(
        dir.path(),
        "tables.curation.json",
        r#"{
            "request_complete": [{"Header Name": "accept-encoding", "Header Value": "gzip"}],
            "request_names": [{"Header Name": "Accept-Encoding"}],
            "response_complete": [],
            "response_names": []
        }"#,
    );

    let err = run_generate(&config, Some(curated.as_path()), dir.path()).unwrap_err();
    assert!(matches!(err, QhError::DuplicateName { .. }));
    assert_eq!(file_names(dir.path()), ["tables.curation.json"]);
}

#[test]
fn test_discovery_requires_a_curated_document() {
    let dir = tempfile::tempdir().unwrap();
    write_capture(dir.path(), "capture.json", "[]");

    let err = discover_curation(dir.path(), "*.curation.json").unwrap_err();
    assert_eq!(err.exit_code(), 2);

    write_capture(dir.path(), "b.curation.json", "{}");
    write_capture(dir.path(), "a.curation.json", "{}");
    let picked = discover_curation(dir.path(), "*.curation.json").unwrap();
    assert_eq!(picked.file_name().unwrap(), "a.curation.json");
}

#[test]
fn test_unreadable_capture_writes_no_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let good = write_capture(dir.path(), "good.json", "[]");
    let bad = write_capture(dir.path(), "bad.json", "{ not json");

    let err = run_aggregate(&config, &[good, bad]).unwrap_err();
    assert!(matches!(err, QhError::Input { .. }));
    assert!(!config.aggregate.output.exists());
}

#[test]
fn test_go_artifact_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.output.source_lang = SourceLang::Go;
    let curated = write_capture(
        dir.path(),
        "go.curation.json",
        r#"{
            "request_complete": [],
            "request_names": [{"Header Name": "cookie", "Count": 1, "Status": "keep"}],
            "response_complete": [],
            "response_names": []
        }"#,
    );

    run_generate(&config, Some(curated.as_path()), dir.path()).unwrap();
    let go = std::fs::read_to_string(dir.path().join("headers.go")).unwrap();
    assert!(go.contains("var requestHeaderTable = map[string]byte{\n\t\"cookie\": 0x01,\n}"));
    assert!(!dir.path().join("headers.rs").exists());
}

#[test]
fn test_pipeline_config_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.table.slot_budget, 255);
    assert_eq!(config.table.protocol_version, "1.0");
    assert_eq!(config.table.duplicate_policy, DuplicatePolicy::Warn);
    assert_eq!(config.output.curation_glob, "*.curation.json");
    assert_eq!(
        config.aggregate.output,
        PathBuf::from("header_analysis.curation.json")
    );
}
