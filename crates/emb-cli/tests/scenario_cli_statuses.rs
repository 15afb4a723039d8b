//! `emb statuses <kind>` prints the registry tables used by filter controls.
#![allow(deprecated)]

use predicates::prelude::*;

#[test]
fn job_table_lists_all_first_then_lifecycle() -> anyhow::Result<()> {
    assert_cmd::Command::cargo_bin("emb-cli")?
        .args(["statuses", "job"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kind=job\n\tall\ncreated\tcreated\n"))
        .stdout(predicate::str::contains("in_progress\tin progress"));
    Ok(())
}

#[test]
fn plural_payment_token_resolves_to_providers() -> anyhow::Result<()> {
    assert_cmd::Command::cargo_bin("emb-cli")?
        .args(["statuses", "payments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind=payment_provider"))
        .stdout(predicate::str::contains("money_transfer\tmoney transfer"));
    Ok(())
}

#[test]
fn json_output_is_an_array_of_entries() -> anyhow::Result<()> {
    let out = assert_cmd::Command::cargo_bin("emb-cli")?
        .args(["statuses", "goods", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out)?;
    let entries = v.as_array().expect("array");
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[2]["code"], "in_stock");
    assert_eq!(entries[2]["label"], "in stock");
    Ok(())
}

#[test]
fn unknown_kind_fails() -> anyhow::Result<()> {
    assert_cmd::Command::cargo_bin("emb-cli")?
        .args(["statuses", "spaceships"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown entity kind"));
    Ok(())
}
