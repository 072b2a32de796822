//! Command-line behaviour that does not need a display server.

use assert_cmd::Command;
use predicates::prelude::*;

fn zenity_forms() -> Command {
    let mut cmd = Command::cargo_bin("zenity-forms").unwrap();
    // Keep any dialog from reaching a real display.
    cmd.env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn no_arguments_is_a_usage_error() {
    zenity_forms()
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no valid dialog type"));
}

#[test]
fn list_without_items_exits_2() {
    zenity_forms()
        .args(["--list", "Pick one"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--items required"));
}

#[test]
fn slider_with_wrong_field_count_exits_2() {
    zenity_forms()
        .args(["--slider", "Volume,0,100"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--slider expects 4"));
}

#[test]
fn radio_without_options_exits_2() {
    zenity_forms()
        .args(["--radio", "Color"])
        .assert()
        .code(2);
}

#[test]
fn unknown_flag_exits_2() {
    zenity_forms()
        .arg("--frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frobnicate"));
}

#[test]
fn help_lists_widget_flags() {
    zenity_forms()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--multi-checkbox"))
        .stdout(predicate::str::contains("--window-size"));
}

#[test]
fn version_prints_package_version() {
    zenity_forms()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_display_is_a_runtime_failure() {
    zenity_forms()
        .env("XDG_RUNTIME_DIR", "/nonexistent")
        .args(["--entry", "Name"])
        .assert()
        .code(100)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("zenity-forms: "));
}

#[test]
fn debug_flag_raises_log_level() {
    zenity_forms()
        .env("XDG_RUNTIME_DIR", "/nonexistent")
        .args(["--entry", "Name", "--debug"])
        .assert()
        .code(100)
        .stderr(predicate::str::contains("showing form"));
}

#[test]
fn debug_as_a_label_is_not_a_flag() {
    zenity_forms()
        .env("XDG_RUNTIME_DIR", "/nonexistent")
        .args(["--entry", "--debug"])
        .assert()
        .code(100)
        .stderr(predicate::str::contains("showing form").not());
}

#[test]
fn message_beats_malformed_widget_flags() {
    // Fails at display time, not at parse time.
    zenity_forms()
        .env("XDG_RUNTIME_DIR", "/nonexistent")
        .args(["--info", "hi", "--list", "Pick"])
        .assert()
        .code(100);
}
