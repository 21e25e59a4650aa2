// Dweve perfmerge - Benchmark Result Aggregation
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Test helper to create a perfmerge command without colors
fn perfmerge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("perfmerge").expect("Failed to find perfmerge binary");
    cmd.env("NO_COLOR", "1").env("CLICOLOR", "0").env_remove("RUST_LOG");
    cmd
}

fn entry(name: &str, heap_avg: f64) -> String {
    format!(
        r#"{{"benchmarkName": "{}", "elapsedSeconds": 0.5, "customData": {{"Heap Used Avg": {}, "Margin of Error": 10, "Iterations": 10}}}}"#,
        name, heap_avg
    )
}

fn document(entries: &[String]) -> String {
    format!(r#"{{"benchmarks": [{}]}}"#, entries.join(","))
}

// Lays out both group directories under a fresh temp dir
struct Fixture {
    root: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(root.path().join("shared_matrix_memory")).unwrap();
        fs::create_dir(root.path().join("shared_tree_memory")).unwrap();
        Self { root }
    }

    fn standard() -> Self {
        let fixture = Self::new();
        fixture.write_a("run1_perfresult.json", &document(&[entry("Insert a row 10 times", 1000.0)]));
        fixture.write_a("run2_perfresult.json", &document(&[entry("Insert a row 10 times", 3000.0)]));
        fixture.write_b(
            "run1_perfresult.json",
            &document(&[
                entry("Insert a row 10 times", 500.0),
                entry("Undo insert a row 10 times", 250.0),
            ]),
        );
        fixture
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn write_a(&self, name: &str, content: &str) {
        fs::write(self.path().join("shared_matrix_memory").join(name), content).unwrap();
    }

    fn write_b(&self, name: &str, content: &str) {
        fs::write(self.path().join("shared_tree_memory").join(name), content).unwrap();
    }

    fn output(&self) -> PathBuf {
        self.path().join("generated_memory.csv")
    }

    fn report(&self) -> Command {
        let mut cmd = perfmerge_cmd();
        cmd.current_dir(self.path()).arg("report");
        cmd
    }
}

// ===== Help and Version Tests =====

#[test]
fn test_help_output() {
    perfmerge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("chart"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_version_output() {
    perfmerge_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("perfmerge"));
}

#[test]
fn test_no_subcommand_fails() {
    perfmerge_cmd().assert().failure();
}

// ===== Report Command Tests =====

#[test]
fn test_report_writes_merged_csv() {
    let fixture = Fixture::standard();

    fixture
        .report()
        .assert()
        .success()
        .stdout(predicate::str::contains("Insert row"))
        .stdout(predicate::str::contains("SM(2)"))
        .stdout(predicate::str::contains("ST(1)"));

    let csv = fs::read_to_string(fixture.output()).unwrap();
    assert!(csv.starts_with(
        "Operation,Elapsed Time (s),Heap Used Avg,Heap Used StdDev,Margin of Error,Relative Margin of Error"
    ));
    assert!(csv.contains("\"SM: 2000\nST: 500\""));
    assert!(csv.contains("Undo insert row"));
    // Undo only exists in group B
    assert!(csv.contains(",ST: 250,"));
}

#[test]
fn test_report_skips_unparsable_document() {
    let fixture = Fixture::standard();
    fixture.write_a("broken_perfresult.json", "{ not json");
    fixture.write_b("nobench_perfresult.json", r#"{"results": []}"#);

    fixture
        .report()
        .assert()
        .success()
        .stderr(predicate::str::contains("broken_perfresult.json"))
        .stderr(predicate::str::contains("nobench_perfresult.json"));

    let csv = fs::read_to_string(fixture.output()).unwrap();
    assert!(csv.contains("\"SM: 2000\nST: 500\""));
}

#[test]
fn test_report_ignores_other_files() {
    let fixture = Fixture::standard();
    fixture.write_a("notes.json", &document(&[entry("Insert a row", 99999.0)]));

    fixture.report().assert().success();

    let csv = fs::read_to_string(fixture.output()).unwrap();
    assert!(!csv.contains("99999"));
}

#[test]
fn test_report_no_data_writes_nothing() {
    let fixture = Fixture::new();
    fixture.write_a("empty_perfresult.json", r#"{"benchmarks": []}"#);
    fixture.write_b("broken_perfresult.json", "not json at all");

    fixture
        .report()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No benchmark data"))
        .stderr(predicate::str::contains("Hint: check --group-a/--group-b"));

    assert!(!fixture.output().exists());
}

#[test]
fn test_report_missing_directories() {
    let root = TempDir::new().unwrap();

    perfmerge_cmd()
        .current_dir(root.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No benchmark data"));

    assert!(!root.path().join("generated_memory.csv").exists());
}

#[test]
fn test_report_custom_labels_and_delimiter() {
    let fixture = Fixture::standard();
    let output = fixture.path().join("custom.csv");

    fixture
        .report()
        .args(["--label-a", "GroupA", "--label-b", "GroupB", "--delimiter", ";"])
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("Operation;Elapsed Time (s);"));
    assert!(csv.contains("\"GroupA: 2000\nGroupB: 500\""));
}

#[test]
fn test_report_rejects_identical_labels() {
    let fixture = Fixture::standard();

    fixture
        .report()
        .args(["--label-a", "X", "--label-b", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must differ"));

    assert!(!fixture.output().exists());
}

#[test]
fn test_report_rejects_zero_jobs() {
    let fixture = Fixture::standard();

    fixture.report().args(["-j", "0"]).assert().failure();
}

#[test]
fn test_report_parallel_matches_serial() {
    let fixture = Fixture::new();
    for i in 0..12 {
        fixture.write_a(
            &format!("run{:02}_perfresult.json", i),
            &document(&[entry("Insert a row", 100.0 * (i + 1) as f64)]),
        );
        fixture.write_b(
            &format!("run{:02}_perfresult.json", i),
            &document(&[entry("Remove a column", 0.1 * i as f64)]),
        );
    }
    let serial = fixture.path().join("serial.csv");
    let parallel = fixture.path().join("parallel.csv");

    fixture
        .report()
        .args(["--parallel-threshold", "1000", "-o"])
        .arg(&serial)
        .assert()
        .success();
    fixture
        .report()
        .args(["--parallel-threshold", "1", "-j", "4", "-o"])
        .arg(&parallel)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&serial).unwrap(),
        fs::read_to_string(&parallel).unwrap()
    );
}

#[test]
fn test_report_quiet_suppresses_summary() {
    let fixture = Fixture::standard();

    fixture
        .report()
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(fixture.output().exists());
}

#[test]
fn test_report_file_size_limit() {
    let fixture = Fixture::standard();

    fixture
        .report()
        .env("PERFMERGE_MAX_FILE_SIZE", "16")
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large"));
}

// ===== Chart Command Tests =====

#[test]
fn test_chart_from_report() {
    let fixture = Fixture::standard();
    fixture.report().assert().success();

    let html = fixture.path().join("memory_charts.html");
    perfmerge_cmd()
        .current_dir(fixture.path())
        .args(["chart", "generated_memory.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("memory_charts.html"));

    let content = fs::read_to_string(html).unwrap();
    assert!(content.contains("<svg"));
    assert!(content.contains("Insert row"));
    assert!(content.contains("SharedMatrix"));
}

#[test]
fn test_chart_custom_title() {
    let fixture = Fixture::standard();
    fixture.report().assert().success();

    let html = fixture.path().join("out.html");
    perfmerge_cmd()
        .current_dir(fixture.path())
        .args(["chart", "generated_memory.csv", "--title", "Matrix <vs> Tree", "-o"])
        .arg(&html)
        .assert()
        .success();

    let content = fs::read_to_string(html).unwrap();
    assert!(content.contains("Matrix &lt;vs&gt; Tree"));
}

#[test]
fn test_chart_rejects_non_report() {
    let fixture = Fixture::new();
    let input = fixture.path().join("other.csv");
    fs::write(&input, "name,value\na,1\n").unwrap();

    perfmerge_cmd()
        .arg("chart")
        .arg(&input)
        .arg("-o")
        .arg(fixture.path().join("out.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid report"));

    assert!(!fixture.path().join("out.html").exists());
}

#[test]
fn test_chart_missing_input() {
    perfmerge_cmd()
        .args(["chart", "/nonexistent/perfmerge/report.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

// ===== Inspect Command Tests =====

#[test]
fn test_inspect_prints_values() {
    let fixture = Fixture::standard();

    perfmerge_cmd()
        .current_dir(fixture.path())
        .args(["inspect", "--operation", "Insert row"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 runs"))
        .stdout(predicate::str::contains("1000, 3000"))
        .stdout(predicate::str::contains("mean 2000"));
}

#[test]
fn test_inspect_limit() {
    let fixture = Fixture::standard();

    perfmerge_cmd()
        .current_dir(fixture.path())
        .args(["inspect", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 runs"))
        .stdout(predicate::str::contains("2 runs").not());
}

#[test]
fn test_inspect_unknown_operation() {
    let fixture = Fixture::standard();

    perfmerge_cmd()
        .current_dir(fixture.path())
        .args(["inspect", "--operation", "Teleport"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no records"));
}
