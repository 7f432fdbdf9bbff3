use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BILL_TEXT: &str = "Nº DO CLIENTE 7204076116 ... Referente a JAN/2024 ... \
    Energia Elétrica kWh 50 47,75 ... Energia SCEE s/ICMS kWh 456 235,42 ... \
    Energia compensada GD I kWh 456 -225,42 ... Contrib Ilum Publica Municipal 49,43";

/// Temp dir with a config that disables the cache and a converted bill.
fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"cache": {"backend": "disabled"}}"#).unwrap();
    let bill = dir.path().join("bill.txt");
    fs::write(&bill, BILL_TEXT).unwrap();
    (dir, config, bill)
}

fn lumi(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lumi").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn layouts_lists_cemig() {
    Command::cargo_bin("lumi")
        .unwrap()
        .arg("layouts")
        .assert()
        .success()
        .stdout(predicate::str::contains("CEMIG"))
        .stdout(predicate::str::contains("compensatedEnergyValue"));
}

#[test]
fn extract_text_bill_as_json() {
    let (_dir, config, bill) = workspace();

    lumi(&config)
        .arg("extract")
        .arg(&bill)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""clientNumber": "7204076116""#))
        .stdout(predicate::str::contains(r#""referenceMonth": "2024-01-01""#))
        .stdout(predicate::str::contains(r#""compensatedEnergyValue": -225.42"#))
        .stdout(predicate::str::contains(r#""method": "regex""#));
}

#[test]
fn extract_text_bill_as_csv() {
    let (_dir, config, bill) = workspace();

    lumi(&config)
        .args(["extract", "--format", "csv"])
        .arg(&bill)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("clientNumber,referenceMonth,"))
        .stdout(predicate::str::contains("7204076116,2024-01-01,50,47.75,456"));
}

#[test]
fn extract_incomplete_bill_fails_validation() {
    let (dir, config, _bill) = workspace();
    let bill = dir.path().join("partial.txt");
    fs::write(&bill, "Nº DO CLIENTE 7204076116 Referente a JAN/2024").unwrap();

    lumi(&config)
        .arg("extract")
        .arg(&bill)
        .assert()
        .failure()
        .stderr(predicate::str::contains("INVALID_DATA"))
        .stderr(predicate::str::contains("INVALID_ELECTRICITY_QUANTITY"));

    lumi(&config)
        .args(["extract", "--no-validate"])
        .arg(&bill)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""clientNumber": "7204076116""#));
}

#[test]
fn extract_unknown_layout() {
    let (_dir, config, bill) = workspace();

    lumi(&config)
        .args(["extract", "--layout", "LIGHT"])
        .arg(&bill)
        .assert()
        .failure()
        .stderr(predicate::str::contains("LAYOUT_NOT_FOUND"));
}

#[test]
fn extract_missing_file() {
    let (dir, config, _bill) = workspace();

    lumi(&config)
        .arg("extract")
        .arg(dir.path().join("nope.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn dashboard_summarizes_extracted_bills() {
    let (dir, config, bill) = workspace();
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();

    lumi(&config)
        .arg("extract")
        .arg(&bill)
        .arg("--output")
        .arg(out.join("bill.json"))
        .assert()
        .success();

    lumi(&config)
        .arg("dashboard")
        .arg(format!("{}/*.json", out.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""invoices": 1"#))
        .stdout(predicate::str::contains(r#""energyConsumptionKwh": 506"#))
        .stdout(predicate::str::contains(r#""gdSavings": 225.42"#));

    lumi(&config)
        .arg("dashboard")
        .arg(format!("{}/*.json", out.display()))
        .args(["--from", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""invoices": 0"#));
}

#[test]
fn config_get_reads_given_file() {
    let (_dir, config, _bill) = workspace();

    lumi(&config)
        .args(["config", "get", "cache.backend"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""disabled""#));

    lumi(&config)
        .args(["config", "get", "cache.ttl_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("86400"));
}
