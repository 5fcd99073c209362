//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BUILTIN_BANK: &str = "../aql-core/banks/personality.toml";
const BUILTIN_QUIZ: &str = "../aql-core/banks/module-quiz.toml";

const FULL_SHEET: &str = r#"
q1 = "q1a"
q2 = 3
q3 = 8
q4 = 6
q5 = "q5a"
q6 = "q6b"
q7 = 5
q8 = 1
q9 = "q9d"
q10 = 2
"#;

fn aql() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("aql").unwrap();
    // Keep a developer's own config out of the runs.
    cmd.env("HOME", std::env::temp_dir().join("aql-cli-tests-home"))
        .env_remove("AQL_NORMALIZATION")
        .env_remove("AQL_ROUNDING")
        .env_remove("AQL_OUTPUT_DIR");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn validate_builtin_bank() {
    aql()
        .arg("validate")
        .arg("--bank")
        .arg(BUILTIN_BANK)
        .assert()
        .success()
        .stdout(predicate::str::contains("12 steps, 10 questions"))
        .stdout(predicate::str::contains("[q6] WARNING"))
        .stdout(predicate::str::contains("[q10] WARNING"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_directory_skips_non_banks() {
    aql()
        .arg("validate")
        .arg("--bank")
        .arg("../aql-core/banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Entrepreneurial Personality Assessment"))
        .stderr(predicate::str::contains("skipping"));
}

#[test]
fn validate_clean_bank() {
    let dir = TempDir::new().unwrap();
    let bank = write(
        dir.path(),
        "bank.toml",
        r#"
[bank]
id = "mini"
name = "Mini"

[[steps]]
id = "q1"
kind = "question"
question_type = "slider"
category = "traits"
trait = "social"
prompt = "How social are you?"

[[steps]]
id = "done"
kind = "results"
"#,
    );

    aql()
        .arg("validate")
        .arg("--bank")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("All step banks valid"));
}

#[test]
fn validate_nonexistent_file() {
    aql()
        .arg("validate")
        .arg("--bank")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    aql()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created aql.toml"))
        .stdout(predicate::str::contains("Created banks/personality.toml"));

    assert!(dir.path().join("aql.toml").exists());
    assert!(dir.path().join("banks/personality.toml").exists());

    // The starter config and bank work together.
    let sheet = write(dir.path(), "answers.toml", FULL_SHEET);
    aql()
        .current_dir(dir.path())
        .arg("take")
        .arg("--answers")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dominant trait: analytical"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    aql().current_dir(dir.path()).arg("init").assert().success();

    aql()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn take_from_answer_sheet() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "answers.toml", FULL_SHEET);

    aql()
        .arg("take")
        .arg("--bank")
        .arg(BUILTIN_BANK)
        .arg("--answers")
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains("56%"))
        .stdout(predicate::str::contains("Dominant trait: analytical"))
        .stdout(predicate::str::contains("Primary learning style: reading"))
        .stdout(predicate::str::contains(
            "Career interests: Technology and Software Development",
        ))
        .stderr(predicate::str::contains("q6: not scored"));
}

#[test]
fn take_json_output() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "answers.toml", FULL_SHEET);

    let output = aql()
        .arg("take")
        .arg("--answers")
        .arg(&sheet)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"]["traits"]["analytical"], 56);
    assert_eq!(report["result"]["traits"]["practical"], 19);
    assert_eq!(report["raw"]["traits"]["analytical"], 15);
    assert_eq!(report["answers"]["q3"]["value"], 8);
    assert_eq!(report["bank"]["question_count"], 10);
}

#[test]
fn take_with_largest_remainder_config() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "answers.toml", FULL_SHEET);
    let config = write(
        dir.path(),
        "aql.toml",
        "[scoring]\nnormalization = \"largest-remainder\"\n",
    );

    let output = aql()
        .arg("take")
        .arg("--answers")
        .arg(&sheet)
        .arg("--config")
        .arg(&config)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let traits = &report["result"]["traits"];
    assert_eq!(traits["analytical"], 56);
    assert_eq!(traits["creative"], 22);
    assert_eq!(traits["practical"], 18);
    assert_eq!(traits["social"], 4);
}

#[test]
fn take_with_incomplete_sheet_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "answers.toml", "q1 = \"q1a\"\n");

    aql()
        .arg("take")
        .arg("--answers")
        .arg(&sheet)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no answer for step 'q2'"));
}

#[test]
fn take_interactive() {
    aql()
        .arg("take")
        .write_stdin("\n1\nq2c\n8\n6\n1\nq6b\n5\n1\n4\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dominant trait: analytical"))
        .stderr(predicate::str::contains("Question 1 of 10"));
}

#[test]
fn take_interactive_input_ends_early() {
    aql()
        .arg("take")
        .write_stdin("\n1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended at step 'q2'"));
}

#[test]
fn take_saves_report_and_show_reads_it() {
    let dir = TempDir::new().unwrap();
    let sheet = write(dir.path(), "answers.toml", FULL_SHEET);
    let out_dir = dir.path().join("results");

    aql()
        .arg("take")
        .arg("--answers")
        .arg(&sheet)
        .arg("--output")
        .arg(&out_dir)
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to"));

    let reports: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);

    aql()
        .arg("show")
        .arg("--report")
        .arg(&reports[0])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dominant trait: analytical"));

    aql()
        .arg("show")
        .arg("--report")
        .arg(&reports[0])
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("**Dominant trait:** analytical"));
}

#[test]
fn show_nonexistent_report() {
    aql()
        .arg("show")
        .arg("--report")
        .arg("no_such_file.json")
        .assert()
        .failure();
}

#[test]
fn grade_module_quiz() {
    let dir = TempDir::new().unwrap();
    let answers = write(
        dir.path(),
        "answers.toml",
        "q1 = \"q1b\"\nq2 = 3\nq3 = \"q3a\"\n",
    );

    aql()
        .arg("grade")
        .arg("--quiz")
        .arg(BUILTIN_QUIZ)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 2/3 (67%) [proficient]"))
        .stdout(predicate::str::contains("Good job!"))
        .stdout(predicate::str::contains("[q3]"));
}

#[test]
fn grade_json_output() {
    let dir = TempDir::new().unwrap();
    let answers = write(
        dir.path(),
        "answers.toml",
        "q1 = \"q1b\"\nq2 = \"q2c\"\nq3 = \"q3b\"\n",
    );

    let output = aql()
        .arg("grade")
        .arg("--quiz")
        .arg(BUILTIN_QUIZ)
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let grade: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(grade["percentage"], 100);
    assert_eq!(grade["tier"], "mastered");
    assert_eq!(grade["missed"], serde_json::json!([]));
}

#[test]
fn help_output() {
    aql()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Personality assessment and module quiz scoring",
        ));
}

#[test]
fn version_output() {
    aql()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aql"));
}
