//! Process exit status tests for the resource_publisher binary
//!
//! A successful run keeps serving until it receives a signal, so those runs
//! are checked for still being alive and then killed.

use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_resource_publisher");

/// The binary, run in `workdir` against the prefix `prefix`, HTTP disabled
fn publisher_command(prefix: &TempDir, workdir: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(BIN);
    command
        .args(args)
        .current_dir(workdir)
        .env("AMENT_PREFIX_PATH", prefix.path())
        .env("RESOURCE_PUBLISHER__SERVER__ENABLED", "false")
        .env_remove("RESOURCE_PUBLISHER__PACKAGES__PREFIXES")
        .env_remove("RESOURCE_PUBLISHER_CONFIG")
        .env_remove("RUST_LOG");
    command
}

fn run_publisher(prefix: &TempDir, args: &[&str]) -> Output {
    let workdir = tempfile::tempdir().unwrap();
    publisher_command(prefix, workdir.path(), args).output().unwrap()
}

fn install_package(name: &str, template: &str) -> TempDir {
    let prefix = tempfile::tempdir().unwrap();
    let markers = prefix.path().join("share/ament_index/resource_index/packages");
    fs::create_dir_all(&markers).unwrap();
    fs::write(markers.join(name), "").unwrap();

    let share = prefix.path().join("share").join(name);
    fs::create_dir_all(&share).unwrap();
    fs::write(share.join("robot.xacro"), template).unwrap();
    prefix
}

#[test]
fn test_missing_required_flag_exits_254() {
    let prefix = tempfile::tempdir().unwrap();
    let output = run_publisher(&prefix, &["-xacro", "robot.xacro"]);
    assert_eq!(output.status.code(), Some(254));
}

#[test]
fn test_unknown_package_exits_254() {
    let prefix = tempfile::tempdir().unwrap();
    let output = run_publisher(&prefix, &["-package", "no_such_pkg", "-xacro", "robot.xacro"]);
    assert_eq!(output.status.code(), Some(254));
}

#[test]
fn test_missing_template_exits_254() {
    let prefix = install_package("bot", "<robot/>");
    let output = run_publisher(&prefix, &["-package", "bot", "-xacro", "absent.xacro"]);
    assert_eq!(output.status.code(), Some(254));
}

#[test]
fn test_empty_topic_is_a_publish_failure() {
    let prefix = install_package("bot", "<robot/>");
    let output = run_publisher(
        &prefix,
        &["--ros-args", "-r", "__node:=pub", "--", "-package", "bot", "-xacro", "robot.xacro"],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_occupied_port_keeps_serving_latched_channels() {
    let prefix = install_package("bot", "<robot/>");
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();
    let workdir = tempfile::tempdir().unwrap();

    let mut child = publisher_command(
        &prefix,
        workdir.path(),
        &["-package", "bot", "-xacro", "robot.xacro", "-topic", "robot_description"],
    )
    .env("RESOURCE_PUBLISHER__SERVER__ENABLED", "true")
    .env("RESOURCE_PUBLISHER__SERVER__HOST", "127.0.0.1")
    .env("RESOURCE_PUBLISHER__SERVER__PORT", port.to_string())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .unwrap();

    thread::sleep(Duration::from_secs(2));
    let status = child.try_wait().unwrap();
    child.kill().unwrap();
    child.wait().unwrap();

    assert!(status.is_none(), "publisher exited early with {:?}", status);
    drop(occupied);
}
