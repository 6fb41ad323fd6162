use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../fatura-core/tests/fixtures")
        .join(name)
}

fn fatura() -> Command {
    Command::cargo_bin("fatura").unwrap()
}

#[test]
fn process_prints_record_as_json() {
    fatura()
        .args(["process"])
        .arg(fixture("group_b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""consumerUnitId": "140753532""#))
        .stdout(predicate::str::contains(r#""month": "DEZ""#))
        .stdout(predicate::str::contains(r#""sourceFileName": "group_b.txt""#));
}

#[test]
fn process_with_diagnostics() {
    fatura()
        .args(["process", "--diagnostics"])
        .arg(fixture("group_a.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tableVersion": "A-3""#))
        .stdout(predicate::str::contains(r#""historyRows": 8"#));
}

#[test]
fn process_csv_and_text_formats() {
    fatura()
        .args(["process", "--format", "csv"])
        .arg(fixture("group_b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("tariffGroup,consumerUnitId,month,year"));

    fatura()
        .args(["process", "--format", "text"])
        .arg(fixture("group_b.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: R$ 289,47"));
}

#[test]
fn process_missing_file_fails() {
    fatura()
        .args(["process", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_rejects_unsupported_format() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("fatura.docx");
    fs::write(&input, "140753532 DEZ/2025").unwrap();

    fatura()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn batch_writes_outputs_summary_and_plan() {
    let dir = tempdir().unwrap();
    fs::copy(fixture("group_b.txt"), dir.path().join("dez.txt")).unwrap();
    fs::write(dir.path().join("vazia.txt"), "SEM DADOS").unwrap();
    let out = dir.path().join("out");
    let plan = dir.path().join("plan.csv");

    fatura()
        .arg("batch")
        .arg(dir.path().join("*.txt").to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .arg("--sheet-plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("2 successful"));

    assert!(out.join("dez.json").exists());
    assert!(out.join("vazia.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.contains("dez.txt,success,B,B-1,140753532,DEZ,2025"));

    let plan = fs::read_to_string(plan).unwrap();
    assert!(plan.starts_with("sheet,cell,value"));
    assert!(plan.contains("RESUMO,F7,140753532"));
    assert!(plan.contains("UC GERADORA,K16,350"));
}

#[test]
fn batch_keeps_going_on_blank_document() {
    let dir = tempdir().unwrap();
    fs::copy(fixture("group_b.txt"), dir.path().join("a.txt")).unwrap();
    fs::write(dir.path().join("b.txt"), "   \n  ").unwrap();
    let out = dir.path().join("out");

    fatura()
        .arg("batch")
        .arg(dir.path().join("*.txt").to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful"));

    let blank = fs::read_to_string(out.join("b.json")).unwrap();
    assert!(blank.contains(r#""consumerUnitId": """#));
    assert!(blank.contains(r#""year": 0"#));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,B,B-1,140753532,DEZ,2025"));
    assert!(summary.contains("b.txt,success,B,B-1,,,0,0,"));
}

#[test]
fn batch_exports_xlsx() {
    let dir = tempdir().unwrap();
    fs::copy(fixture("group_b.txt"), dir.path().join("dez.txt")).unwrap();
    fs::copy(fixture("group_a.txt"), dir.path().join("nov.txt")).unwrap();
    let workbook = dir.path().join("balanco.xlsx");

    fatura()
        .arg("batch")
        .arg(dir.path().join("*.txt").to_str().unwrap())
        .arg("--xlsx")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workbook written to"));

    let bytes = fs::read(&workbook).unwrap();
    assert!(!bytes.is_empty());
    // xlsx is a zip container
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn batch_without_matches_fails() {
    let dir = tempdir().unwrap();

    fatura()
        .arg("batch")
        .arg(dir.path().join("*.pdf").to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn config_path_is_reported() {
    fatura()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}

#[test]
fn config_set_and_get_use_known_keys() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("fatura.json");

    fatura()
        .arg("-c")
        .arg(&config)
        .args(["config", "init", "--group", "a"])
        .assert()
        .success();

    fatura()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "extraction.reserved_column", "seventh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("extraction.reserved_column = seventh"));

    fatura()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "extraction.tariff_group"])
        .assert()
        .success()
        .stdout(predicate::str::diff("a\n"));

    fatura()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "sheet.summary_unit_cell", "F0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for sheet.summary_unit_cell"));

    fatura()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "extraction.unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));

    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains(r#""reserved_column": "seventh""#));
    assert!(saved.contains(r#""tariff_group": "a""#));
}
