#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

mod common;

#[test]
fn test_rocksdb_settlement_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: seed the empty database and pay job 2 (201 from profile 1 to 6).
    Command::new(cargo_bin!("jobpay"))
        .arg("--seed")
        .arg(common::seed_dir())
        .arg("--db-path")
        .arg(&db_path)
        .args(["pay", "2", "--profile", "1"])
        .assert()
        .success();

    // 2. Second run: the seed is ignored because the database is populated.
    Command::new(cargo_bin!("jobpay"))
        .arg("--seed")
        .arg(common::seed_dir())
        .arg("--db-path")
        .arg(&db_path)
        .arg("balances")
        .assert()
        .success()
        .stdout(predicate::str::contains("1,client,949"))
        .stdout(predicate::str::contains("6,contractor,1415"));

    // 3. Third run: paying the same job again is rejected.
    Command::new(cargo_bin!("jobpay"))
        .arg("--db-path")
        .arg(&db_path)
        .args(["pay", "2", "--profile", "1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("NOT_FOUND"));
}
