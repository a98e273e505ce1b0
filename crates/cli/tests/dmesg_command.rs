use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

fn write_device_fakes(dir: &std::path::Path) -> [std::path::PathBuf; 3] {
    let uptime = dir.join("uptime.txt");
    fs::write(&uptime, "60.0 120.0\n").expect("write uptime");
    let date = dir.join("date.txt");
    fs::write(&date, "2026:03:01:12:01:00\n").expect("write date");
    let dmesg = dir.join("dmesg.txt");
    fs::write(&dmesg, "<6>[   60.000000] init: starting service\n").expect("write dmesg");
    [uptime, date, dmesg]
}

/// Stamps are rewritten from seconds-since-boot to absolute datetimes.
#[test]
fn dmesg_rewrites_timestamps() {
    let dir = tempdir().expect("tempdir");
    let [uptime, date, dmesg] = write_device_fakes(dir.path());

    assert_cmd::cargo::cargo_bin_cmd!("lmtool")
        .env("LMTOOL_FAKE_UPTIME", &uptime)
        .env("LMTOOL_FAKE_DATE", &date)
        .env("LMTOOL_FAKE_DMESG", &dmesg)
        .arg("dmesg")
        .assert()
        .success()
        .stdout(predicate::str::contains("[2026-03-01 12:01:00] init: starting service"));
}

/// Unintelligible device date output is a hard failure with context.
#[test]
fn dmesg_fails_on_bad_device_date() {
    let dir = tempdir().expect("tempdir");
    let [uptime, date, dmesg] = write_device_fakes(dir.path());
    fs::write(&date, "not a date\n").expect("overwrite date");

    assert_cmd::cargo::cargo_bin_cmd!("lmtool")
        .env("LMTOOL_FAKE_UPTIME", &uptime)
        .env("LMTOOL_FAKE_DATE", &date)
        .env("LMTOOL_FAKE_DMESG", &dmesg)
        .arg("dmesg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("device date"));
}
