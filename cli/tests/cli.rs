use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn toolbox(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("toolbox").expect("binary builds");
    cmd.arg("--db").arg(db);
    cmd
}

#[test]
fn init_demo_stats_generate_happy_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("toolbox.db");

    toolbox(&db)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized successfully"));

    toolbox(&db)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample data loaded successfully"));

    toolbox(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Categories: 2"))
        .stdout(predicate::str::contains("Projects: 3"))
        .stdout(predicate::str::contains("Application Development Frameworks (2 projects)"));

    let output = dir.path().join("out.md");
    toolbox(&db)
        .arg("generate")
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let document = std::fs::read_to_string(&output).expect("generated file");
    assert!(document.starts_with("# AI Engineering Toolbox"));
    assert!(document.contains("### [Ollama]"));
}

#[test]
fn commands_refuse_before_init() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("toolbox.db");

    toolbox(&db)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run 'toolbox init'"));
}

#[test]
fn second_demo_warns_but_succeeds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("toolbox.db");

    toolbox(&db).arg("init").assert().success();
    toolbox(&db).arg("demo").assert().success();
    toolbox(&db)
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("already contains data"));
}

#[test]
fn meta_set_then_get_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("toolbox.db");

    toolbox(&db).arg("init").assert().success();
    toolbox(&db)
        .args(["meta", "set", "title", "My Toolbox"])
        .assert()
        .success();
    toolbox(&db)
        .args(["meta", "get", "title"])
        .assert()
        .success()
        .stdout(predicate::str::contains("My Toolbox"));

    toolbox(&db)
        .args(["meta", "get", "missing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no value set"));
}

#[test]
fn version_prints_product_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("toolbox.db");

    toolbox(&db)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("AI Engineering Toolbox v"));
}

#[test]
fn generate_accepts_template_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("toolbox.db");
    let template = dir.path().join("custom.md");
    std::fs::write(&template, "TITLE={{title}}\n").expect("write template");

    toolbox(&db).arg("init").assert().success();

    let output = dir.path().join("out.md");
    toolbox(&db)
        .arg("generate")
        .arg("--template")
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let document = std::fs::read_to_string(&output).expect("generated file");
    assert_eq!(document, "TITLE=AI Engineering Toolbox\n");
}
