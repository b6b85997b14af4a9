use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn sample_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn dashboard(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wellness-dashboard"))
        .arg("--data-dir")
        .arg(sample_data())
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run wellness-dashboard")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn overview_summarizes_sample_data() {
    let output = dashboard(&["overview"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("- Total users analyzed: 18"));
    assert!(text.contains("- Balanced Usage Group: 5 users (50.0%)"));
    assert!(text.contains("- High-Risk Users: 1 users (12.5%)"));
}

#[test]
fn balanced_teen_is_low_risk() {
    let output = dashboard(&[
        "assess",
        "--age",
        "13-15",
        "--daily-usage",
        "4",
        "--social-media",
        "2",
        "--sleep-hours",
        "8",
        "--bedtime-screen",
        "0",
        "--late-night",
        "Never",
        "--sleep-quality",
        "Good",
        "--phone",
        "No, I charge it outside",
        "--plan",
    ]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("[ok] Low Risk (score 0)"));
    assert!(text.contains("- User group: Balanced Usage Group"));
    assert!(text.contains("1. Keep your daily screen time under 6 hours"));
}

#[test]
fn adult_with_calm_habits_is_moderate_and_report_is_written() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("plan.md");
    let output = dashboard(&[
        "assess",
        "--age",
        "28-35",
        "--daily-usage",
        "5",
        "--social-media",
        "2",
        "--sleep-hours",
        "7",
        "--bedtime-screen",
        "0",
        "--late-night",
        "never",
        "--sleep-quality",
        "good",
        "--phone",
        "no",
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("[!] Moderate Risk (score 0)"));

    let report = std::fs::read_to_string(&out).unwrap();
    assert!(report.starts_with("# Digital Wellness Report"));
    assert!(report.contains("- User group: Regular Users"));
    assert!(report.contains("1. Schedule two short social media windows per day"));
}

#[test]
fn unknown_answer_is_rejected_by_the_parser() {
    let output = dashboard(&[
        "assess",
        "--age",
        "twelve",
        "--daily-usage",
        "4",
        "--social-media",
        "2",
        "--sleep-hours",
        "8",
        "--bedtime-screen",
        "0",
        "--late-night",
        "Never",
        "--sleep-quality",
        "Good",
        "--phone",
        "no",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid answer for age group"));
}

#[test]
fn missing_data_halts_before_rendering() {
    let empty = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_wellness-dashboard"))
        .arg("--data-dir")
        .arg(empty.path())
        .arg("research")
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not load dashboard data"));
}

#[test]
fn session_runs_over_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_wellness-dashboard"))
        .arg("--data-dir")
        .arg(sample_data())
        .arg("session")
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"research\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).contains("Selected model: Hierarchical (silhouette 0.775)"));
}
