use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REPORT: &str = r#"[
  [
    ["Emissão", "Série", "Número", "Situação", "Chave de acesso", "CFOP", "Valor (R$)"],
    ["01/01/2024", "1", "100", "Normal", "35240112345678000199550010000001001000000018", "5102", "R$ 1.234,56"],
    ["01/01/2024", "1", "101", "Cancelada", "98765432109876543210987654321098765432109876", "5102", "R$ 10,00"]
  ],
  null
]"#;

fn nfrel(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nfrel").unwrap();
    // Keep the user's config file out of the tests
    cmd.env("XDG_CONFIG_HOME", home.path()).env("HOME", home.path());
    cmd
}

fn write_report(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn extract_json_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.json", REPORT);

    let output = nfrel(&dir).arg("extract").arg(&input).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["record_count"], 2);
    assert_eq!(json["summary"]["total_value"], "1244.56");
    assert_eq!(json["records"][1]["situacao"], "Cancelada");
}

#[test]
fn extract_reports_reconciliation() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.json", REPORT);

    nfrel(&dir)
        .args(["extract", "-f", "text", "--expected-total", "R$ 1.244,56"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: R$ 1.244,56"))
        .stderr(predicate::str::contains("Matches printed total"));

    nfrel(&dir)
        .args(["extract", "-f", "text", "--expected-total", "1.000,00"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("differs by R$ 244,56"));
}

#[test]
fn extract_empty_document() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "empty.json", "[null, null]");

    nfrel(&dir)
        .args(["extract", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 0"));

    nfrel(&dir)
        .args(["extract", "--fail-on-empty"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No records could be extracted"));
}

#[test]
fn extract_xlsx_needs_output() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.json", REPORT);

    nfrel(&dir)
        .args(["extract", "-f", "xlsx"])
        .arg(&input)
        .assert()
        .failure();

    let out = dir.path().join("report.xlsx");
    nfrel(&dir)
        .args(["extract", "-f", "xlsx", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success();
    assert!(fs::read(&out).unwrap().starts_with(b"PK"));
}

#[test]
fn extract_csv_input_with_forced_schema() {
    let dir = TempDir::new().unwrap();
    let input = write_report(
        dir.path(),
        "report.csv",
        "Emissão,Número,Situação,Chave de acesso,Valor\n02/01/2024,55,Normal,123,\"R$ 45,00\"\n",
    );

    let output = nfrel(&dir)
        .args(["extract", "--schema", "reduced"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["schema"], "reduced");
    assert_eq!(json["records"][0]["serie"], serde_json::Value::Null);
    assert_eq!(json["summary"]["total_value"], "45.00");
}

#[test]
fn extract_semicolon_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_report(
        dir.path(),
        "report.csv",
        "Emissão;Número;Situação;Chave de acesso;Valor\n\
         01/01/2024;100;Normal;123;R$ 1.234,56\n\
         01/01/2024;101;Inutilizada;456;0,00\n",
    );

    let output = nfrel(&dir)
        .args(["extract", "-d", ";"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["schema"], "reduced");
    assert_eq!(json["records"][0]["emissao"], "01/01/2024");
    assert_eq!(json["records"][0]["valor"], "1234.56");
    assert_eq!(json["summary"]["zero_valued_count"], 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("1 records with zero value"));

    // Same delimiter from the config file
    let config = write_report(dir.path(), "nfrel.json", r#"{"extraction": {"csv_delimiter": ";"}}"#);
    nfrel(&dir)
        .arg("--config")
        .arg(&config)
        .args(["extract", "-f", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: R$ 1.234,56"));
}

#[test]
fn extract_rejects_numeric_json_cells() {
    let dir = TempDir::new().unwrap();
    let input = write_report(
        dir.path(),
        "report.json",
        r#"[[["01/01/2024", "1", "100", "Normal", "123", "5102", 1234.56]]]"#,
    );

    nfrel(&dir)
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("found a number"));
}

#[test]
fn extract_rejects_unknown_input() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "report.pdf", "%PDF-1.7");

    nfrel(&dir)
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported input format"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    write_report(dir.path(), "a.json", REPORT);
    write_report(dir.path(), "b.json", "[null]");
    write_report(dir.path(), "broken.json", "[[1, 2");
    let out = dir.path().join("out");

    let pattern = format!("{}/*.json", dir.path().display());
    nfrel(&dir)
        .args(["batch", "--summary", "--continue-on-error", "-f", "csv", "-o"])
        .arg(&out)
        .arg(&pattern)
        .assert()
        .success();

    assert!(out.join("a.csv").exists());
    assert!(out.join("b.csv").exists());
    assert!(!out.join("broken.csv").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.json,success,full,2,1244.56,0,0"));
    assert!(summary.contains("broken.json,error"));
}

#[test]
fn batch_keeps_outputs_with_same_stem() {
    let dir = TempDir::new().unwrap();
    write_report(dir.path(), "a.json", REPORT);
    write_report(dir.path(), "a.csv", "01/01/2024,100,Normal,123,\"R$ 45,00\"\n");
    let out = dir.path().join("out");

    let pattern = format!("{}/a.*", dir.path().display());
    nfrel(&dir)
        .args(["batch", "-f", "json", "-o"])
        .arg(&out)
        .arg(&pattern)
        .assert()
        .success();

    let from_json: serde_json::Value =
        serde_json::from_slice(&fs::read(out.join("a_json.json")).unwrap()).unwrap();
    let from_csv: serde_json::Value =
        serde_json::from_slice(&fs::read(out.join("a_csv.json")).unwrap()).unwrap();
    assert_eq!(from_json["summary"]["total_value"], "1244.56");
    assert_eq!(from_csv["summary"]["total_value"], "45.00");
}

#[test]
fn config_set_and_get() {
    let dir = TempDir::new().unwrap();

    nfrel(&dir)
        .args(["config", "set", "extraction.schema", "reduced"])
        .assert()
        .success();

    nfrel(&dir)
        .args(["config", "get", "extraction.schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reduced\""));

    nfrel(&dir)
        .args(["config", "set", "extraction.schema", "wide"])
        .assert()
        .failure();

    nfrel(&dir)
        .args(["config", "set", "extraction.nonexistent", "1"])
        .assert()
        .failure();
}

#[test]
fn config_commands_follow_config_flag() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.json");

    nfrel(&dir)
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "output.sheet_name", "Entradas"])
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("Entradas"));

    nfrel(&dir)
        .arg("--config")
        .arg(&path)
        .args(["config", "get", "output.sheet_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entradas"));

    // The default file was never written
    nfrel(&dir)
        .args(["config", "get", "output.sheet_name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Relatorio_Fiscal"));
}
