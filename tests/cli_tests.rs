use assert_cmd::Command;
use predicates::prelude::*;

#[test]
#[allow(deprecated)]
fn test_main_binary_help() {
    Command::cargo_bin("zabbix-report")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Zabbix trend reports"));
}

#[test]
#[allow(deprecated)]
fn test_host_report_help() {
    Command::cargo_bin("zabbix-host-report")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--hosts"));
}

#[test]
#[allow(deprecated)]
fn test_group_report_help() {
    Command::cargo_bin("zabbix-group-report")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--groups"))
        .stdout(predicate::str::contains("--jobs"));
}

#[test]
#[allow(deprecated)]
fn test_drive_subcommand() {
    Command::cargo_bin("zabbix-report")
        .unwrap()
        .arg("drive")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GiB"));
}

#[test]
#[allow(deprecated)]
fn test_missing_config_file_fails() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("zabbix-report")
        .unwrap()
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .arg("group")
        .args(["--groups", "Linux servers", "--start", "2024-01-01", "--end", "2024-01-03"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("reading config file"));
}

#[test]
#[allow(deprecated)]
fn test_config_without_url_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.toml");
    std::fs::write(&config, "[api]\nusername = \"Admin\"\n").unwrap();
    Command::cargo_bin("zabbix-report")
        .unwrap()
        .env_remove("ZABBIX_URL")
        .arg("--config")
        .arg(&config)
        .args(["host", "--hosts", "10084", "--start", "2024-01-01", "--end", "2024-01-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api.url"));
}

#[test]
#[allow(deprecated)]
fn test_reversed_dates_fail_before_connecting() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("config.toml");
    // Nothing listens here; the date check must fail first.
    std::fs::write(
        &config,
        "[api]\nurl = \"http://127.0.0.1:9/api_jsonrpc.php\"\nusername = \"Admin\"\n",
    )
    .unwrap();
    Command::cargo_bin("zabbix-report")
        .unwrap()
        .env_remove("ZABBIX_URL")
        .env_remove("ZABBIX_USER")
        .arg("--config")
        .arg(&config)
        .args(["host", "--hosts", "10084", "--start", "2024-01-03", "--end", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("before start date"));
}
