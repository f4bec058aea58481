//! In-process RSA backend built on the `rsa` crate.
//!
//! Private keys are written as PKCS#8 PEM and public keys as SPKI PEM, which is
//! what `openssl genpkey` and `openssl rsa -pubout` produce. Both PKCS#1 and
//! PKCS#8 encodings are accepted when reading.

use std::path::Path;

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use super::backend::{KeyBackend, KeyBackendError, KeyKind};

/// Key backend that performs every operation in-process.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCryptoBackend;

impl RustCryptoBackend {
    /// Create a new in-process backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl KeyBackend for RustCryptoBackend {
    fn name(&self) -> &'static str {
        "rust-crypto"
    }

    fn generate_private_key(&self, path: &Path, bits: usize) -> Result<(), KeyBackendError> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| KeyBackendError::Crypto(format!("key generation failed: {e}")))?;
        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyBackendError::Crypto(format!("cannot encode private key: {e}")))?;
        write_file(path, pem.as_bytes())
    }

    fn derive_public_key(
        &self,
        private_key: &Path,
        public_key: &Path,
    ) -> Result<(), KeyBackendError> {
        let private_key = read_private_key(private_key)?;
        let pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| KeyBackendError::Crypto(format!("cannot encode public key: {e}")))?;
        write_file(public_key, pem.as_bytes())
    }

    fn validate_key(&self, path: &Path, kind: KeyKind) -> Result<(), KeyBackendError> {
        match kind {
            KeyKind::Private => {
                let key = read_private_key(path)?;
                key.validate()
                    .map_err(|e| KeyBackendError::Crypto(format!("inconsistent private key: {e}")))
            }
            KeyKind::Public => read_public_key(path).map(|_| ()),
        }
    }

    fn keys_match(&self, private_key: &Path, public_key: &Path) -> Result<bool, KeyBackendError> {
        let derived = read_private_key(private_key)?.to_public_key();
        let on_disk = read_public_key(public_key)?;
        Ok(derived == on_disk)
    }
}

fn read_pem(path: &Path) -> Result<String, KeyBackendError> {
    std::fs::read_to_string(path).map_err(|source| KeyBackendError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), KeyBackendError> {
    std::fs::write(path, contents).map_err(|source| KeyBackendError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_private_key(path: &Path) -> Result<RsaPrivateKey, KeyBackendError> {
    let pem = read_pem(path)?;
    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
        .map_err(|e| KeyBackendError::Crypto(format!("not an RSA private key: {e}")))
}

fn read_public_key(path: &Path) -> Result<RsaPublicKey, KeyBackendError> {
    let pem = read_pem(path)?;
    RsaPublicKey::from_public_key_pem(&pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(&pem))
        .map_err(|e| KeyBackendError::Crypto(format!("not an RSA public key: {e}")))
}
