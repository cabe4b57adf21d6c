//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DATASET: &str = r#"
[[programs]]
id = "p1"
name = "B.Tech CSE"

[[courses]]
id = "c1"
name = "Algorithms"
semester = 4
program_id = "p1"

[[students]]
id = "s1"
name = "Alice"
email = "alice@univ.edu"
roll_number = "CS-01"

[[students]]
id = "s2"
name = "Bob"
email = "bob@univ.edu"
roll_number = "CS-02"

[[course_outcomes]]
id = "co1"
course_id = "c1"
co_code = "CO1"
description = "Analyse complexity"

[[course_outcomes]]
id = "co2"
course_id = "c1"
co_code = "CO2"
description = "Design greedy algorithms"

[[program_outcomes]]
id = "po1"
po_code = "PO1"
description = "Engineering knowledge"

[[co_po_links]]
co_id = "co1"
po_id = "po1"

[[co_po_links]]
co_id = "co2"
po_id = "po1"

[[exams]]
id = "e1"
course_id = "c1"
exam_type = "Internal"
exam_date = "2024-03-01"

[[questions]]
id = "q1"
exam_id = "e1"
text = "Master theorem"
max_marks = 10
co_id = "co1"

[[questions]]
id = "q2"
exam_id = "e1"
text = "Amortised analysis"
max_marks = 10
co_id = "co1"

[[questions]]
id = "q3"
exam_id = "e1"
text = "Huffman coding"
max_marks = 10
co_id = "co2"

[[marks]]
student_id = "s1"
question_id = "q1"
obtained_marks = 8

[[marks]]
student_id = "s1"
question_id = "q2"
obtained_marks = 6

[[marks]]
student_id = "s1"
question_id = "q3"
obtained_marks = 10

[[marks]]
student_id = "s2"
question_id = "q1"
obtained_marks = 4
"#;

const FAULTY_MARK: &str = r#"
[[marks]]
student_id = "s2"
question_id = "q3"
obtained_marks = 15
"#;

/// A temp directory holding `dataset.toml`, used as both HOME and cwd.
fn workspace(extra: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dataset.toml");
    std::fs::write(&path, format!("{DATASET}{extra}")).unwrap();
    (dir, path)
}

fn copo(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("copo").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("COPO_DATASET")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn validate_clean_dataset() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 courses"))
        .stdout(predicate::str::contains("Dataset valid"));
}

#[test]
fn validate_reports_warnings() {
    let (dir, path) = workspace(FAULTY_MARK);
    copo(dir.path())
        .arg("validate")
        .arg("--dataset")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[s2/q3] WARNING"))
        .stdout(predicate::str::contains("exceed maximum 10"));
}

#[test]
fn validate_nonexistent_dataset() {
    let dir = TempDir::new().unwrap();
    copo(dir.path())
        .arg("validate")
        .arg("--dataset")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn missing_dataset_is_explained() {
    let dir = TempDir::new().unwrap();
    copo(dir.path())
        .arg("class")
        .arg("--course")
        .arg("c1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no dataset configured"));
}

#[test]
fn student_table() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .args(["student", "--student", "s1", "--course", "c1", "--dataset"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("CO1"))
        .stdout(predicate::str::contains("70.00%"))
        .stdout(predicate::str::contains("100.00%"));
}

#[test]
fn student_json() {
    let (dir, path) = workspace("");
    let output = copo(dir.path())
        .args(["student", "--student", "s2", "--course", "c1", "--format", "json"])
        .arg("--dataset")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let outcomes = value["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["co_code"], "CO1");
    assert_eq!(outcomes[0]["attainment_percentage"], 20.0);
}

#[test]
fn unknown_student_exits_1() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .args(["student", "--student", "nobody", "--course", "c1", "--dataset"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("student not found: nobody"));
}

#[test]
fn class_table() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .args(["class", "--course", "c1", "--dataset"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("45.00%"))
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("Bob"));
}

#[test]
fn po_for_program_and_course() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .args(["po", "--program", "p1", "--dataset"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("PO1"))
        .stdout(predicate::str::contains("72.50%"));

    copo(dir.path())
        .args(["po", "--course", "c1", "--format", "json", "--dataset"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"attainment_percentage\": 72.5"));
}

#[test]
fn po_requires_a_scope() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .args(["po", "--dataset"])
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn faults_are_warnings_unless_configured() {
    let (dir, path) = workspace(FAULTY_MARK);
    copo(dir.path())
        .args(["class", "--course", "c1", "--dataset"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: mark s2/q3"));

    std::fs::write(dir.path().join("copo.toml"), "fail_on_fault = true\n").unwrap();
    copo(dir.path())
        .args(["class", "--course", "c1", "--dataset"])
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("100.00%"))
        .stderr(predicate::str::contains("1 integrity fault(s)"));
}

#[test]
fn dataset_from_config_and_env() {
    let (dir, path) = workspace("");
    std::fs::write(
        dir.path().join("copo.toml"),
        "dataset = \"dataset.toml\"\nformat = \"json\"\n",
    )
    .unwrap();
    copo(dir.path())
        .args(["class", "--course", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"class_average\": 45.0"));

    let elsewhere = TempDir::new().unwrap();
    copo(elsewhere.path())
        .env("COPO_DATASET", &path)
        .args(["class", "--course", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("45.00%"));
}

#[test]
fn report_to_file() {
    let (dir, path) = workspace("");
    let out = dir.path().join("reports").join("s1.json");
    copo(dir.path())
        .args(["report", "--student", "s1", "--dataset"])
        .arg(&path)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["student"]["roll_number"], "CS-01");
    assert_eq!(value["courses"][0]["course_name"], "Algorithms");
}

#[test]
fn report_unknown_course_exits_1() {
    let (dir, path) = workspace("");
    copo(dir.path())
        .args(["report", "--student", "s1", "--course", "c9", "--dataset"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("course not found: c9"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    copo(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created copo.toml"))
        .stdout(predicate::str::contains("Created datasets/sample.toml"));

    assert!(dir.path().join("copo.toml").exists());
    assert!(dir.path().join("datasets/sample.toml").exists());

    copo(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dataset valid"));

    copo(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("copo.toml already exists, skipping."));
}
