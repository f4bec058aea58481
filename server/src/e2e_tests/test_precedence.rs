//! Command line versus configuration file versus defaults.

use super::helpers::{TestInstallation, arg};
use crate::config::ConfigError;
use crate::testing::fixture_key_pair;

/// Install a known key pair so the tests below skip key generation.
fn install_with_keys() -> TestInstallation {
    let install = TestInstallation::new();
    let (private_pem, public_pem) = fixture_key_pair();
    std::fs::write(install.default_private_key(), private_pem).unwrap();
    std::fs::write(install.default_public_key(), public_pem).unwrap();
    install
}

const FILE_WITH_SERVER: &str = r#"
[server]
address = "192.168.1.10"
port = 9443

[[user]]
username = "alice"
password = "alice-hash"
claims = ["admin", "planner"]

[[user]]
username = "bob"
password = "bob-hash"
"#;

#[test]
fn test_file_values_apply_without_flags() {
    let install = install_with_keys();
    install.write_config(FILE_WITH_SERVER);

    let config = install.resolve(&[]).unwrap();
    assert_eq!(config.socket_addr().to_string(), "192.168.1.10:9443");
    assert_eq!(config.users().len(), 2);
    assert_eq!(config.lookup_user("alice").claims(), ["admin", "planner"]);
    assert!(config.lookup_user("bob").claims().is_empty());
}

#[test]
fn test_flags_win_over_file() {
    let install = install_with_keys();
    install.write_config(FILE_WITH_SERVER);

    let config = install.resolve(&["--address", "::", "--port", "8443"]).unwrap();
    assert_eq!(config.socket_addr().to_string(), "[::]:8443");
}

#[test]
fn test_each_flag_overrides_only_its_field() {
    let install = install_with_keys();
    install.write_config(FILE_WITH_SERVER);

    let config = install.resolve(&["-p", "1"]).unwrap();
    assert_eq!(config.socket_addr().to_string(), "192.168.1.10:1");

    let config = install.resolve(&["-a", "10.1.2.3"]).unwrap();
    assert_eq!(config.socket_addr().to_string(), "10.1.2.3:9443");
}

#[test]
fn test_defaults_fill_remaining_gaps() {
    let install = install_with_keys();
    install.write_config("[server]\nport = 8000\n");

    let config = install.resolve(&[]).unwrap();
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
}

#[test]
fn test_explicit_config_path() {
    let install = install_with_keys();
    let other = install.root().join("other.toml");
    std::fs::write(&other, "[server]\nport = 7000\n").unwrap();

    let config = install.resolve(&["--config", arg(&other)]).unwrap();
    assert_eq!(config.port(), 7000);
}

#[test]
fn test_unknown_user_lookup() {
    let install = install_with_keys();
    install.write_config(FILE_WITH_SERVER);

    let config = install.resolve(&[]).unwrap();
    let user = config.lookup_user("nonexistent");
    assert_eq!(user.name(), "nonexistent");
    assert_eq!(user.password_record(), "");
    assert!(user.claims().is_empty());
    assert_eq!(config.users().len(), 2);
}

#[test]
fn test_missing_password_names_user_and_file() {
    let install = install_with_keys();
    install.write_config("[[user]]\nusername = \"dave\"\nclaims = [\"x\"]\n");

    let err = install.resolve(&[]).unwrap_err();
    assert!(matches!(&err, ConfigError::MissingPassword { username, .. } if username == "dave"));
    assert!(err.to_string().contains(&install.config_file().display().to_string()));
}

#[test]
fn test_malformed_file_names_file() {
    let install = install_with_keys();
    install.write_config("[[user]\nusername = \"eve\"\n");

    let err = install.resolve(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}
