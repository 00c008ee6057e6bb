#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};

const PROCESS_CONTROL: &str = "com.apple.instruments.server.services.processcontrol";
const DEVICE_INFO: &str = "com.apple.instruments.server.services.deviceinfo";
const APP_LISTING: &str = "com.apple.instruments.server.services.device.applictionListing";
const SYSMONTAP: &str = "com.apple.instruments.server.services.sysmontap";
const LAUNCH: &str =
    "launchSuspendedProcessWithDevicePath:bundleIdentifier:environment:arguments:options:";

struct FixtureFile {
    dir: PathBuf,
    path: PathBuf,
}

impl FixtureFile {
    fn new(tag: &str, fixture: &Value) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "instrkit-cli-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join("device.json");
        std::fs::write(&path, fixture.to_string()).expect("fixture should be writable");
        Self { dir, path }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_instrkit"))
            .env_remove("INSTRKIT_FIXTURE")
            .arg("--log-level")
            .arg("error")
            .arg("--format")
            .arg("json")
            .arg("--fixture")
            .arg(&self.path)
            .args(args)
            .output()
            .expect("instrkit should run")
    }
}

impl Drop for FixtureFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

fn device_info() -> Value {
    json!({
        "_deviceDescription": "iPhone 13 Pro",
        "_deviceDisplayName": "Test Phone",
        "_deviceIdentifier": "00008110-000A",
        "_deviceVersion": "17.4.1",
        "_productType": "iPhone14,2",
        "_productVersion": "17.4.1",
    })
}

#[test]
fn ps_lists_processes_and_reports_skipped() {
    let fixture = FixtureFile::new(
        "ps",
        &json!({
            "replies": { DEVICE_INFO: { "runningProcesses": [
                { "pid": 1, "name": "launchd" },
                { "name": "no-pid" },
                { "pid": 312, "name": "SpringBoard", "isApplication": true },
            ] } }
        }),
    );

    let output = fixture.run(&["ps"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    let out = &lines[0];
    assert_eq!(out["kind"], "process-list");
    assert_eq!(out["count"], 2);
    assert_eq!(out["records"][1]["name"], "SpringBoard");
    assert_eq!(out["records"][1]["isApplication"], true);
    assert_eq!(out["skipped"][0]["index"], 1);
    assert_eq!(out["skipped"][0]["raw"], json!({ "name": "no-pid" }));
}

#[test]
fn apps_passes_filter_and_token() {
    let fixture = FixtureFile::new(
        "apps",
        &json!({
            "replies": { APP_LISTING: {
                "installedApplicationsMatching:registerUpdateToken:": [{
                    "CFBundleIdentifier": "com.apple.Preferences",
                    "DisplayName": "Settings",
                    "Type": "System",
                    "Version": "1.0",
                    "Restricted": 1,
                    "BundlePath": "/Applications/Preferences.app",
                }]
            } }
        }),
    );

    let output = fixture.run(&["apps", "--filter", "Type=System", "--update-token", "abc"]);
    assert!(output.status.success());

    let out = &json_lines(&output)[0];
    assert_eq!(out["kind"], "application-list");
    assert_eq!(out["records"][0]["CFBundleIdentifier"], "com.apple.Preferences");
    assert_eq!(out["skipped"], json!([]));
}

#[test]
fn launch_prints_pid() {
    let fixture = FixtureFile::new(
        "launch",
        &json!({
            "replies": { PROCESS_CONTROL: {
                LAUNCH: 4242
            } }
        }),
    );

    let output = fixture.run(&["launch", "com.example.app", "--env", "A=1", "--kill-existing"]);
    assert!(output.status.success());

    let out = &json_lines(&output)[0];
    assert_eq!(out["kind"], "launch");
    assert_eq!(out["bundle_id"], "com.example.app");
    assert_eq!(out["pid"], 4242);
}

#[test]
fn launch_fault_exits_69_with_message() {
    let fixture = FixtureFile::new(
        "launch-fault",
        &json!({
            "replies": { PROCESS_CONTROL: {
                LAUNCH: {
                    "NSUserInfo": { "NSLocalizedDescription": "Not allowed" }
                }
            } }
        }),
    );

    let output = fixture.run(&["launch", "com.example.app"]);
    assert_eq!(output.status.code(), Some(69));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not allowed"));
    assert!(output.stdout.is_empty());
}

#[test]
fn kill_reports_sent() {
    let fixture = FixtureFile::new("kill", &json!({}));

    let output = fixture.run(&["kill", "555"]);
    assert!(output.status.success());

    let out = &json_lines(&output)[0];
    assert_eq!(out["kind"], "kill");
    assert_eq!(out["pid"], 555);
    assert_eq!(out["sent"], true);
}

#[test]
fn device_info_prints_fields() {
    let fixture = FixtureFile::new(
        "device-info",
        &json!({ "replies": { DEVICE_INFO: { "systemInformation": device_info() } } }),
    );

    let output = fixture.run(&["device-info"]);
    assert!(output.status.success());

    let out = &json_lines(&output)[0];
    assert_eq!(out["kind"], "device-info");
    assert_eq!(out["_productType"], "iPhone14,2");
    assert_eq!(out["_deviceDisplayName"], "Test Phone");
}

#[test]
fn device_info_missing_field_exits_60() {
    let mut info = device_info();
    info.as_object_mut()
        .expect("device info is an object")
        .remove("_productType");
    let fixture = FixtureFile::new(
        "device-info-bad",
        &json!({ "replies": { DEVICE_INFO: { "systemInformation": info } } }),
    );

    let output = fixture.run(&["device-info"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("_productType"));
}

#[test]
fn refused_channel_exits_3() {
    let fixture = FixtureFile::new("refused", &json!({ "refuse": [DEVICE_INFO] }));

    let output = fixture.run(&["ps"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn failing_selector_exits_3() {
    let fixture = FixtureFile::new(
        "failing",
        &json!({ "fail": { PROCESS_CONTROL: ["killPid:"] } }),
    );

    let output = fixture.run(&["kill", "1"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn sysmontap_stops_after_count() {
    let fixture = FixtureFile::new(
        "sysmontap",
        &json!({
            "streams": { SYSMONTAP: [
                { "CPUCount": 6, "Type": 41 },
                { "Processes": { "1": [0.5, 1024] } },
                { "Type": 7 },
            ] }
        }),
    );

    let output = fixture.run(&["sysmontap", "--count", "2", "--interval", "200ms"]);
    assert!(output.status.success());

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["kind"], "sysmon-sample");
    assert_eq!(lines[0]["index"], 0);
    assert_eq!(lines[0]["sample"]["CPUCount"], 6);
    assert_eq!(lines[1]["index"], 1);
}

#[test]
fn sysmontap_idle_timeout_ends_stream() {
    let fixture = FixtureFile::new(
        "sysmontap-idle",
        &json!({ "streams": { SYSMONTAP: [{ "Type": 41 }] } }),
    );

    let output = fixture.run(&["sysmontap", "--idle-timeout", "300ms"]);
    assert!(output.status.success());
    assert_eq!(json_lines(&output).len(), 1);
}

#[test]
fn missing_fixture_is_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_instrkit"))
        .env_remove("INSTRKIT_FIXTURE")
        .arg("ps")
        .output()
        .expect("instrkit should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--fixture"));
}

#[test]
fn malformed_fixture_is_data_invalid() {
    let fixture = FixtureFile::new("malformed", &json!({ "replys": {} }));

    let output = fixture.run(&["ps"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_instrkit"))
        .arg("version")
        .output()
        .expect("instrkit should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("instrkit "));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
