use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn desk_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("poultrydesk"))
}

fn init_config(temp_dir: &TempDir) -> String {
    let config_path = temp_dir.path().join("desk-config");
    desk_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
    config_path.to_str().unwrap().to_string()
}

#[test]
fn test_help() {
    desk_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CLI trade desk"));
}

#[test]
fn test_version() {
    desk_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("poultrydesk"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("desk-config");

    desk_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized poultrydesk config"));

    // Check files were created
    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("desk-config");

    // First init should succeed
    desk_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // Second init should fail
    desk_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_dashboard_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    desk_cmd()
        .args(["-C", config_path.to_str().unwrap(), "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_session_show_empty() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args(["-C", &config_path, "session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No session stored"));
}

#[test]
fn test_session_set_and_show() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "session",
            "set",
            "--token",
            "abcdef1234567890",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored session token"));

    desk_cmd()
        .args(["-C", &config_path, "session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abcdef12"))
        .stdout(predicate::str::contains("user"))
        // The full token never appears in output
        .stdout(predicate::str::contains("abcdef1234567890").not());
}

#[test]
fn test_session_set_admin() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "session",
            "set",
            "--token",
            "abcdef1234567890",
            "--admin",
        ])
        .assert()
        .success();

    desk_cmd()
        .args(["-C", &config_path, "session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin"));
}

#[test]
fn test_session_set_rejects_bad_expiry() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "session",
            "set",
            "--token",
            "abcdef1234567890",
            "--expires",
            "next tuesday",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_session_show_marks_expired() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "session",
            "set",
            "--token",
            "abcdef1234567890",
            "--expires",
            "2020-01-01T00:00:00Z",
        ])
        .assert()
        .success();

    desk_cmd()
        .args(["-C", &config_path, "session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(expired)"));
}

#[test]
fn test_session_clear() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "session",
            "set",
            "--token",
            "abcdef1234567890",
        ])
        .assert()
        .success();

    desk_cmd()
        .args(["-C", &config_path, "session", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session cleared"));

    desk_cmd()
        .args(["-C", &config_path, "session", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No session stored"));
}

#[test]
fn test_dashboard_without_session() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args(["-C", &config_path, "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No session token stored"));
}

#[test]
fn test_sales_entry_requires_route() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "sales",
            "entry",
            "--driver",
            "d1",
            "--vehicle",
            "v1",
            "--line",
            "c1:10:5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Route, Driver, and Vehicle is mandatory",
        ));
}

#[test]
fn test_sales_entry_rejects_malformed_line() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "sales",
            "entry",
            "--route",
            "r1",
            "--driver",
            "d1",
            "--vehicle",
            "v1",
            "--line",
            "justacustomer",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid line"));
}

#[test]
fn test_sales_entry_rejects_bad_number() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "sales",
            "entry",
            "--route",
            "r1",
            "--driver",
            "d1",
            "--vehicle",
            "v1",
            "--line",
            "c1:abc:5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid number 'abc' for kilograms"));
}

#[test]
fn test_sales_entry_requires_complete_line() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    // A line with neither kilograms nor rate parses but cannot be submitted
    desk_cmd()
        .args([
            "-C",
            &config_path,
            "sales",
            "entry",
            "--route",
            "r1",
            "--driver",
            "d1",
            "--vehicle",
            "v1",
            "--line",
            "c1::",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No complete line items"));
}

#[test]
fn test_purchase_entry_requires_supplier() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "purchase",
            "entry",
            "--vehicle",
            "v1",
            "--driver",
            "d1",
            "--dc",
            "DC-1:100:500:80",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Date, Vehicle No, Driver, and Supplier is mandatory",
        ));
}

#[test]
fn test_purchase_entry_requires_line_quantities() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    // Missing nos on the DC line
    desk_cmd()
        .args([
            "-C",
            &config_path,
            "purchase",
            "entry",
            "--vehicle",
            "v1",
            "--driver",
            "d1",
            "--supplier",
            "s1",
            "--dc",
            "DC-1::500",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nos and Kilograms"));
}

#[test]
fn test_purchase_entry_rejects_missing_attachment() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "purchase",
            "entry",
            "--vehicle",
            "v1",
            "--driver",
            "d1",
            "--supplier",
            "s1",
            "--dc",
            "DC-1:100:500:80",
            "--attach",
            temp_dir.path().join("nope.pdf").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Attachment not found"));
}

#[test]
fn test_purchase_entry_rejects_oversized_attachment() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    let big = temp_dir.path().join("scan.pdf");
    let file = fs::File::create(&big).unwrap();
    file.set_len(6 * 1024 * 1024).unwrap();

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "purchase",
            "entry",
            "--vehicle",
            "v1",
            "--driver",
            "d1",
            "--supplier",
            "s1",
            "--dc",
            "DC-1:100:500:80",
            "--attach",
            big.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("over the 5 MB limit"));
}

#[test]
fn test_purchase_payment_rejects_zero_amount() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "purchase",
            "payment",
            "--supplier",
            "s1",
            "--amount",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid number '0' for amount"));
}

#[test]
fn test_report_rejects_wrong_subtype() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    // 'supplier' is a purchase dimension, not a sale dimension
    desk_cmd()
        .args([
            "-C",
            &config_path,
            "report",
            "--type",
            "sale",
            "--sub-type",
            "supplier",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid for sale reports"));
}

#[test]
fn test_report_rejects_bad_date() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "report",
            "--type",
            "sale",
            "--sub-type",
            "route",
            "--from",
            "01/01/2024",
            "--to",
            "2024-01-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_master_create_rejects_unknown_field() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "master",
            "create",
            "customers",
            "--set",
            "nope=1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown column 'nope'"));
}

#[test]
fn test_master_create_rejects_id_assignment() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "master",
            "create",
            "customers",
            "--set",
            "id=5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server-assigned"));
}

#[test]
fn test_master_create_rejects_bad_assignment() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args([
            "-C",
            &config_path,
            "master",
            "create",
            "customers",
            "--set",
            "noequals",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid field assignment"));
}

#[test]
fn test_master_list_rejects_unknown_entity() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    desk_cmd()
        .args(["-C", &config_path, "master", "list", "widgets"])
        .assert()
        .failure();
}
