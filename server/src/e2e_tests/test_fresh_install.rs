//! A fresh installation with no keys and a minimal configuration file.

use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::helpers::TestInstallation;
use crate::auth::SigningKeys;
use crate::keys::{KeyBackend, KeyKind, RustCryptoBackend};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
}

#[test]
fn test_fresh_install_generates_usable_keys() {
    let install = TestInstallation::new();
    install.write_config(
        r#"
[[user]]
username = "alice"
password = "alice-hash"
claims = ["admin"]
"#,
    );

    let config = install.resolve(&[]).unwrap();

    assert_eq!(install.key_files(), ["private_key.pem", "public_key.pem"]);
    assert_eq!(
        config.private_key(),
        std::fs::read_to_string(install.default_private_key()).unwrap()
    );
    assert_eq!(
        config.public_key(),
        std::fs::read_to_string(install.default_public_key()).unwrap()
    );

    let backend = RustCryptoBackend::new();
    backend
        .validate_key(&install.default_private_key(), KeyKind::Private)
        .unwrap();
    backend
        .validate_key(&install.default_public_key(), KeyKind::Public)
        .unwrap();
    assert!(backend
        .keys_match(&install.default_private_key(), &install.default_public_key())
        .unwrap());
}

#[test]
fn test_generated_keys_sign_and_verify() {
    let install = TestInstallation::new();
    install.write_config("");

    let config = install.resolve(&[]).unwrap();
    let keys = SigningKeys::from_configuration(&config).unwrap();

    let claims = Claims {
        sub: "alice".to_string(),
        exp: 4_102_444_800,
    };
    let token = encode(&Header::new(Algorithm::RS256), &claims, keys.encoding_key()).unwrap();
    let decoded =
        decode::<Claims>(&token, keys.decoding_key(), &Validation::new(Algorithm::RS256)).unwrap();
    assert_eq!(decoded.claims.sub, "alice");
}

#[test]
fn test_second_start_reuses_keys() {
    let install = TestInstallation::new();
    install.write_config("");

    let first = install.resolve(&[]).unwrap();
    let second = install.resolve(&[]).unwrap();

    assert_eq!(first.private_key(), second.private_key());
    assert_eq!(first.public_key(), second.public_key());
}

#[test]
fn test_missing_key_directory_fails() {
    let install = TestInstallation::new();
    std::fs::remove_dir(install.root().join("keys")).unwrap();
    install.write_config("");

    let err = install.resolve(&[]).unwrap_err();
    assert!(err.to_string().contains("cannot be created"));
}
