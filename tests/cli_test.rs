use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_json_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["--input", "tests/fixtures/annuity.json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"monthlyPayment\""))
        .stdout(predicate::str::contains("\"schedule\""))
        .stdout(predicate::str::contains("\"month\": 240"));

    Ok(())
}

#[test]
fn test_cli_table_from_flags() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "--loan-amount",
        "1200000",
        "--interest-rate",
        "12",
        "--loan-term",
        "12",
        "--payment-type",
        "differential",
        "--output",
        "table",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Monthly payment:"))
        .stdout(predicate::str::contains("112000.00"))
        .stdout(predicate::str::contains("101000.00"));

    Ok(())
}

#[test]
fn test_cli_summary_with_down_payment() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "--input",
        "tests/fixtures/differential_with_down_payment.json",
        "--output",
        "summary",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Principal: 1200000.00"))
        .stdout(predicate::str::contains("Interest:  78000.00"))
        .stdout(predicate::str::contains("Year"));

    Ok(())
}

#[test]
fn test_cli_reads_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = assert_cmd::Command::new(cargo_bin!());
    cmd.args(["--input", "-", "--output", "table"])
        .write_stdin(r#"{"loanAmount": 120000, "interestRate": 0, "loanTerm": 12}"#);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("10000.00"));

    Ok(())
}

#[test]
fn test_cli_rejects_missing_term() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["--input", "tests/fixtures/missing_term.json"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("loanTerm"));

    Ok(())
}

#[test]
fn test_cli_rejects_malformed_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["--input", "tests/fixtures/malformed.json"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("malformed JSON"));

    Ok(())
}

#[test]
fn test_cli_reports_computation_failure() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["--loan-amount", "1000", "--interest-rate", "1200", "--loan-term", "200"]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("calculation failed"));

    Ok(())
}

#[test]
fn test_cli_rejects_term_above_limit() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args(["--loan-amount", "1000", "--interest-rate", "6", "--loan-term", "4000000000"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("loanTerm"));

    Ok(())
}
