//! # Subcommand Handler Tests
//!
//! Each handler runs against real files in a temporary directory. Crystals
//! are produced by crystallizing a one-step echo dispatcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use crystal_cli::{compare, inspect, stats, verify};
use crystal_core::{Clock, EventType, FixedClock, TraceRecord};
use crystal_proof::{
    outcome, CrystalScenario, Crystallizer, CrystallizerConfig, DispatchError, Dispatcher,
    Envelope, HandlerRegistry, ProofCrystal,
};

struct Echo;

struct EchoDispatcher {
    clock: Arc<dyn Clock>,
    trace: Vec<TraceRecord>,
}

impl Dispatcher for EchoDispatcher {
    fn dispatch(&mut self, envelope: &Envelope) -> Result<Value, DispatchError> {
        for event in [EventType::DispatchReceived, EventType::DispatchComplete] {
            let at = self.clock.now_ms();
            self.trace.push(TraceRecord::from(event).with_field("at", at));
        }
        Ok(outcome::ok(envelope.clone()))
    }

    fn trace(&self) -> Vec<TraceRecord> {
        self.trace.clone()
    }
}

impl HandlerRegistry for Echo {
    type Dispatcher = EchoDispatcher;

    fn dispatcher(&self, clock: Arc<dyn Clock>) -> EchoDispatcher {
        EchoDispatcher {
            clock,
            trace: Vec::new(),
        }
    }
}

fn crystal() -> ProofCrystal {
    let c = Crystallizer::new(
        CrystallizerConfig::new(Arc::new(FixedClock::new(1_704_499_200_000)), Echo)
            .with_performance_runs(4),
    );
    let scenario = CrystalScenario::builder("echo", |_| json!({"hello": "world"})).build();
    c.crystallize(&scenario, None).expect("crystallize")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn write_crystal(dir: &TempDir, name: &str, crystal: &ProofCrystal) -> PathBuf {
    write(dir, name, &crystal.to_json_pretty().expect("to json"))
}

fn output(f: impl FnOnce(&mut Vec<u8>)) -> String {
    let mut buf = Vec::new();
    f(&mut buf);
    String::from_utf8(buf).expect("utf8")
}

fn verify_args(path: &Path, json: bool) -> verify::VerifyArgs {
    verify::VerifyArgs {
        crystal: path.to_path_buf(),
        json,
    }
}

#[test]
fn verify_accepts_sealed_crystal() {
    let dir = TempDir::new().expect("tempdir");
    let crystal = crystal();
    let path = write_crystal(&dir, "echo.json", &crystal);

    let mut valid = false;
    let text = output(|out| valid = verify::run(&verify_args(&path, false), out).expect("verify"));
    assert!(valid);
    assert!(text.starts_with(&format!("VALID {} (CRYSTALLIZED)", crystal.crystal_id())));
}

#[test]
fn verify_rejects_edited_crystal() {
    let dir = TempDir::new().expect("tempdir");
    let mut value = serde_json::to_value(crystal()).expect("to value");
    value["scenarioName"] = json!("not-echo");
    let path = write(&dir, "edited.json", &value.to_string());

    let mut valid = true;
    let text = output(|out| valid = verify::run(&verify_args(&path, false), out).expect("verify"));
    assert!(!valid);
    assert!(text.starts_with("INVALID"));
    assert!(text.contains("  - Crystal hash mismatch"));
}

#[test]
fn verify_json_output_parses() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_crystal(&dir, "echo.json", &crystal());
    let text = output(|out| {
        verify::run(&verify_args(&path, true), out).expect("verify");
    });
    let parsed: Value = serde_json::from_str(&text).expect("json");
    assert_eq!(parsed["valid"], true);
    assert_eq!(parsed["errors"], json!([]));
}

#[test]
fn verify_rejects_non_crystal() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "samples.json", "[1, 2, 3]");
    let mut sink = Vec::new();
    let err = verify::run(&verify_args(&path, false), &mut sink).unwrap_err();
    assert!(err.to_string().contains("is not a crystal"));
}

#[test]
fn inspect_prints_summary_and_events() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_crystal(&dir, "echo.json", &crystal());
    let args = inspect::InspectArgs {
        crystal: path,
        events: true,
    };
    let text = output(|out| inspect::run(&args, out).expect("inspect"));
    assert!(text.contains("PROOF CRYSTAL: echo"));
    assert!(text.contains("DISPATCH_RECEIVED"));
    assert!(text.contains("DISPATCH_COMPLETE"));
}

#[test]
fn stats_mixes_samples_and_crystals() {
    let dir = TempDir::new().expect("tempdir");
    let samples = write(&dir, "baseline.json", "[1, 2, 3, 4, 5]");
    let stored = write_crystal(&dir, "echo.json", &crystal());
    let args = stats::StatsArgs {
        files: vec![samples, stored],
    };
    let text = output(|out| stats::run(&args, out).expect("stats"));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("| baseline | 5 | 3.000 |"));
    assert!(lines[3].starts_with("| echo | 4 | 0.000 |"));
}

#[test]
fn stats_rejects_empty_sample() {
    let dir = TempDir::new().expect("tempdir");
    let args = stats::StatsArgs {
        files: vec![write(&dir, "empty.json", "[]")],
    };
    let mut sink = Vec::new();
    let err = stats::run(&args, &mut sink).unwrap_err();
    assert!(err.to_string().contains("cannot profile"));
}

#[test]
fn compare_reports_significance() {
    let dir = TempDir::new().expect("tempdir");
    let a: Vec<u32> = (1..=10).collect();
    let b: Vec<u32> = (11..=20).collect();
    let args = compare::CompareArgs {
        baseline: write(&dir, "a.json", &json!(a).to_string()),
        candidate: write(&dir, "b.json", &json!(b).to_string()),
        alpha: 0.05,
    };
    let mut significant = false;
    let text = output(|out| significant = compare::run(&args, out).expect("compare"));
    assert!(significant);
    assert!(text.contains("U  = 0"));
    assert!(text.contains("significant at alpha = 0.05"));
    assert!(!text.contains("not significant"));
}

#[test]
fn compare_identical_is_not_significant() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "a.json", "[3, 1, 2]");
    let args = compare::CompareArgs {
        baseline: path.clone(),
        candidate: path,
        alpha: 0.05,
    };
    let mut significant = true;
    let text = output(|out| significant = compare::run(&args, out).expect("compare"));
    assert!(!significant);
    assert!(text.contains("not significant"));
}

#[test]
fn compare_rejects_bad_alpha() {
    let dir = TempDir::new().expect("tempdir");
    let path = write(&dir, "a.json", "[1]");
    let args = compare::CompareArgs {
        baseline: path.clone(),
        candidate: path,
        alpha: 1.5,
    };
    let mut sink = Vec::new();
    assert!(compare::run(&args, &mut sink).is_err());
}
