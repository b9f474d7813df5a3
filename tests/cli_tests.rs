//! Integration tests for the CLI interface
//!
//! Nothing here reaches the public services: lookups either stop at input
//! validation or are pointed at a closed local port.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const CLOSED_PORT: &str = "http://127.0.0.1:9";

fn cepdist() -> Command {
    let mut cmd = Command::cargo_bin("cepdist").unwrap();
    for key in [
        "CEPDIST_LOG_LEVEL",
        "CEPDIST_VIACEP_URL",
        "CEPDIST_NOMINATIM_URL",
        "CEPDIST_USER_AGENT",
        "CEPDIST_HTTP_TIMEOUT_SECS",
        "CEPDIST_LOCATION_PERMISSION",
        "CEPDIST_LOCATION_LAT",
        "CEPDIST_LOCATION_LON",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// Config file pointing every service at a closed port
fn offline_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[http]
timeout_secs = 2

[postal_lookup]
base_url = "{CLOSED_PORT}/ws"

[geocoder]
base_url = "{CLOSED_PORT}"

[location]
permission = "denied"
source = "none"
ip_lookup_url = "{CLOSED_PORT}/json"
"#
    )
    .unwrap();
    file
}

#[test]
fn test_cli_help_flag() {
    cepdist()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("distance"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_missing_subcommand() {
    cepdist().assert().failure().stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_validate_accepts_eight_digits() {
    cepdist()
        .args(["validate", "01310100"])
        .assert()
        .success()
        .stdout(predicate::str::diff("valid\n"));
}

#[test]
fn test_validate_rejects_bad_codes() {
    for bad in ["0131010", "0131010a", "01310-100", "013101000"] {
        cepdist()
            .args(["validate", bad])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("invalid"));
    }
}

#[test]
fn test_distance_with_invalid_cep_fails_fast() {
    cepdist()
        .args(["distance", "12ab5678"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("postal_code"));
}

#[test]
fn test_missing_config_file() {
    cepdist()
        .args(["-c", "/definitely/not/here/cepdist.toml", "locate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_locate_with_manual_position() {
    let config = offline_config();
    cepdist()
        .arg("-c")
        .arg(config.path())
        .args(["locate", "--lat", "-23.5505", "--lon", "-46.6333", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"phase\": \"awaiting_postal_code\""))
        .stdout(predicate::str::contains("-23.5505"));
}

#[test]
fn test_distance_settles_despite_failures() {
    let config = offline_config();
    cepdist()
        .arg("-c")
        .arg(config.path())
        .args(["distance", "01310100", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("permission_denied"))
        .stdout(predicate::str::contains("network_failure"))
        .stdout(predicate::str::contains("\"distance_km\": null"));
}

#[test]
fn test_distance_text_output_reports_warnings() {
    let config = offline_config();
    cepdist()
        .arg("-c")
        .arg(config.path())
        .args(["distance", "01310100", "--deny-location"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"))
        .stdout(predicate::str::contains("You are at:   unknown"));
}

#[test]
fn test_interactive_session() {
    let config = offline_config();
    cepdist()
        .arg("-c")
        .arg(config.path())
        .arg("interactive")
        .write_stdin("abc\nshow\nclear\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status:       idle"))
        .stderr(predicate::str::contains("warning:"));
}

/// Offline config whose device location is pinned but still needs a yes
fn prompting_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[http]
timeout_secs = 2

[postal_lookup]
base_url = "{CLOSED_PORT}/ws"

[geocoder]
base_url = "{CLOSED_PORT}"

[location]
permission = "prompt"
source = "fixed"
latitude = -23.5505
longitude = -46.6333
"#
    )
    .unwrap();
    file
}

#[test]
fn test_locate_answers_permission_prompt_from_stdin() {
    let config = prompting_config();
    cepdist()
        .arg("-c")
        .arg(config.path())
        .arg("locate")
        .write_stdin("y\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Allow access to your location?"))
        .stdout(predicate::str::contains("You are at:   (-23.550500, -46.633300)"));
}

#[test]
fn test_interactive_prompt_shares_stdin_with_commands() {
    let config = prompting_config();
    cepdist()
        .arg("-c")
        .arg(config.path())
        .arg("interactive")
        .write_stdin("y\nclear\nlocate\ny\nshow\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You are at:   (-23.550500, -46.633300)"))
        .stdout(predicate::str::contains("Status:       idle"))
        .stderr(predicate::str::contains("Please enter a valid postal code").not());
}
