use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "rdt-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn run_json(args: &[&str]) -> Value {
    let output = Command::new(env!("CARGO_BIN_EXE_rdt_sim"))
        .args(args)
        .arg("--json")
        .output()
        .expect("run rdt_sim");
    assert!(
        output.status.success(),
        "rdt_sim failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("parse summary json")
}

#[test]
fn rdt_sim_reports_complete_stream_over_faulty_channel() {
    let report = run_json(&["--sim-time-ms", "10000", "--seed", "7"]);

    assert_eq!(report["stream_ok"], Value::Bool(true));
    assert_eq!(report["complete"], Value::Bool(true));
    let sent = report["app_bytes_sent"].as_u64().expect("app_bytes_sent");
    assert!(sent > 0);
    assert_eq!(report["app_bytes_delivered"].as_u64(), Some(sent));
    assert!(report["data_link"]["lost_pkts"].as_u64().expect("lost_pkts") > 0);
}

#[test]
fn rdt_sim_reads_config_file_and_applies_cli_overrides() {
    let dir = unique_temp_dir("rdt-sim-config");
    let config = write_file(
        &dir,
        "config.json",
        r#"
{
    "sim_time_ms": 2000,
    "loss_rate": 0.0,
    "corrupt_rate": 0.0,
    "reorder_rate": 0.0,
    "rdt": { "congestion": { "kind": "aimd", "base": 2, "upper_bound": 8 } }
}
        "#,
    );

    let report = run_json(&[
        "--config",
        config.to_str().unwrap(),
        "--fixed-window",
        "3",
    ]);

    assert_eq!(report["complete"], Value::Bool(true));
    assert_eq!(report["final_window"].as_u64(), Some(3));
    assert_eq!(report["sender"]["timeout_retransmits"].as_u64(), Some(0));
}

#[test]
fn rdt_sim_writes_viz_json_with_meta_first() {
    let dir = unique_temp_dir("rdt-sim-viz");
    let out_json = dir.join("viz.json");

    let output = Command::new(env!("CARGO_BIN_EXE_rdt_sim"))
        .args([
            "--sim-time-ms",
            "1000",
            "--packet-size",
            "64",
            "--viz-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run rdt_sim");
    assert!(
        output.status.success(),
        "rdt_sim failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("stream_ok=true"), "stdout: {stdout}");

    let raw = fs::read_to_string(&out_json).expect("read viz json");
    let events: Value = serde_json::from_str(&raw).expect("parse viz json");
    let events = events.as_array().expect("viz json is an array");
    assert!(!events.is_empty());
    assert_eq!(events[0]["kind"], Value::String("meta".to_string()));
    assert_eq!(events[0]["packet_size"].as_u64(), Some(64));
    assert!(events.iter().any(|e| e["kind"] == "send_data"));
    assert!(events.iter().any(|e| e["kind"] == "deliver"));
}

#[test]
fn rdt_sim_rejects_invalid_rates() {
    let output = Command::new(env!("CARGO_BIN_EXE_rdt_sim"))
        .args(["--loss", "1.5"])
        .output()
        .expect("run rdt_sim");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("loss_rate"));
}
