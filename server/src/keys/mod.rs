//! RSA key material management.
//!
//! This module makes sure the server has a usable RSA key pair before it
//! starts: the private key is generated when missing, the public key is
//! derived from it when missing, both are validated, checked to belong
//! together and finally read into memory as PEM text.
//!
//! # Pre-conditions
//! - The directories containing the key files exist.
//!
//! # Post-conditions
//! - On success both files exist, are valid RSA keys and form a matching pair.
//! - An existing private key is never overwritten.
//!
//! # Invariants
//! - A public key is only ever derived from the private key, never generated
//!   on its own.
//! - Each step opens and closes its files before the next step starts.

pub mod backend;
pub mod openssl;
pub mod rust_crypto;

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub use backend::{DEFAULT_KEY_BITS, KeyBackend, KeyBackendError, KeyKind};
pub use openssl::OpensslBackend;
pub use rust_crypto::RustCryptoBackend;

/// A loaded key pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPair {
    /// PEM-encoded private key.
    pub private_key_pem: String,
    /// PEM-encoded public key.
    pub public_key_pem: String,
}

/// Errors raised while resolving key material.
#[derive(Debug)]
pub enum KeyError {
    /// The private key file appeared while we were about to create it.
    PrivateKeyExists(PathBuf),
    /// The private key file could not be created.
    PrivateKeyNotCreatable { path: PathBuf, source: std::io::Error },
    /// The backend failed to generate a private key.
    PrivateKeyGeneration(KeyBackendError),
    /// The private key file does not exist.
    PrivateKeyMissing(PathBuf),
    /// The private key file cannot be opened for reading.
    PrivateKeyUnreadable { path: PathBuf, source: std::io::Error },
    /// The private key is not a valid RSA private key.
    PrivateKeyInvalid(KeyBackendError),
    /// The private key cannot be opened to derive a public key.
    PublicKeySourceUnreadable { path: PathBuf, source: std::io::Error },
    /// The public key file could not be created.
    PublicKeyNotCreatable { path: PathBuf, source: std::io::Error },
    /// The backend failed to derive a public key.
    PublicKeyGeneration(KeyBackendError),
    /// The public key file does not exist.
    PublicKeyMissing(PathBuf),
    /// The public key file cannot be opened for reading.
    PublicKeyUnreadable { path: PathBuf, source: std::io::Error },
    /// The public key is not a valid RSA public key.
    PublicKeyInvalid(KeyBackendError),
    /// The public key does not belong to the private key.
    KeyMismatch,
    /// The backend could not compare the two keys.
    KeyComparison(KeyBackendError),
    /// The private key could not be loaded after validation.
    ReadPrivateKey { path: PathBuf, source: std::io::Error },
    /// The public key could not be loaded after validation.
    ReadPublicKey { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivateKeyExists(path) => write!(
                f,
                "Cannot generate new private key, because the file {} already exists.",
                path.display()
            ),
            Self::PrivateKeyNotCreatable { path, source } => write!(
                f,
                "Failed to generate private key, because the file {} cannot be created ({source}).",
                path.display()
            ),
            Self::PrivateKeyGeneration(e) => write!(f, "Failed to generate private key ({e})."),
            Self::PrivateKeyMissing(path) => {
                write!(f, "Private key file does not exist {}.", path.display())
            }
            Self::PrivateKeyUnreadable { path, source } => write!(
                f,
                "Private key file {} cannot be read ({source}).",
                path.display()
            ),
            Self::PrivateKeyInvalid(e) => write!(f, "Private key file is invalid ({e})."),
            Self::PublicKeySourceUnreadable { path, source } => write!(
                f,
                "Failed to generate public key, because the private key file {} cannot be opened ({source}).",
                path.display()
            ),
            Self::PublicKeyNotCreatable { path, source } => write!(
                f,
                "Failed to generate public key, because the file {} cannot be created ({source}).",
                path.display()
            ),
            Self::PublicKeyGeneration(e) => write!(f, "Failed to generate public key ({e})."),
            Self::PublicKeyMissing(path) => {
                write!(f, "Public key file does not exist {}.", path.display())
            }
            Self::PublicKeyUnreadable { path, source } => write!(
                f,
                "Public key file {} cannot be read ({source}).",
                path.display()
            ),
            Self::PublicKeyInvalid(e) => write!(f, "Public key file is invalid ({e})."),
            Self::KeyMismatch => write!(f, "The public key seems not to belong to the private key."),
            Self::KeyComparison(e) => write!(f, "Failed to compare the key pair ({e})."),
            Self::ReadPrivateKey { path, source } => write!(
                f,
                "Failed to read private key from {}: {source}",
                path.display()
            ),
            Self::ReadPublicKey { path, source } => write!(
                f,
                "Failed to read public key from {}: {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PrivateKeyNotCreatable { source, .. }
            | Self::PrivateKeyUnreadable { source, .. }
            | Self::PublicKeySourceUnreadable { source, .. }
            | Self::PublicKeyNotCreatable { source, .. }
            | Self::PublicKeyUnreadable { source, .. }
            | Self::ReadPrivateKey { source, .. }
            | Self::ReadPublicKey { source, .. } => Some(source),
            Self::PrivateKeyGeneration(e)
            | Self::PrivateKeyInvalid(e)
            | Self::PublicKeyGeneration(e)
            | Self::PublicKeyInvalid(e)
            | Self::KeyComparison(e) => Some(e),
            Self::PrivateKeyExists(_)
            | Self::PrivateKeyMissing(_)
            | Self::PublicKeyMissing(_)
            | Self::KeyMismatch => None,
        }
    }
}

/// Resolves a private/public key file pair into loaded PEM text.
///
/// All backend calls happen sequentially in a fixed order:
/// generate (if needed), validate private, derive (if needed),
/// validate public, pairing check.
pub struct KeyMaterialManager<'a> {
    backend: &'a dyn KeyBackend,
    bits: usize,
}

impl<'a> KeyMaterialManager<'a> {
    /// Create a manager that generates keys of [`DEFAULT_KEY_BITS`] bits.
    #[must_use]
    pub const fn new(backend: &'a dyn KeyBackend) -> Self {
        Self {
            backend,
            bits: DEFAULT_KEY_BITS,
        }
    }

    /// Resolve the key pair at the given paths.
    ///
    /// # Post-conditions
    /// - Both files exist, are valid and match.
    /// - The returned PEM text is exactly the file contents.
    pub fn resolve(&self, private_key: &Path, public_key: &Path) -> Result<KeyPair, KeyError> {
        if !private_key.exists() {
            self.generate_private_key(private_key)?;
        }
        self.check_private_key(private_key)?;

        if !public_key.exists() {
            self.generate_public_key(private_key, public_key)?;
        }
        self.check_public_key(public_key)?;

        self.check_keys_are_matching(private_key, public_key)?;

        let private_key_pem =
            std::fs::read_to_string(private_key).map_err(|source| KeyError::ReadPrivateKey {
                path: private_key.to_path_buf(),
                source,
            })?;
        let public_key_pem =
            std::fs::read_to_string(public_key).map_err(|source| KeyError::ReadPublicKey {
                path: public_key.to_path_buf(),
                source,
            })?;

        Ok(KeyPair {
            private_key_pem,
            public_key_pem,
        })
    }

    fn generate_private_key(&self, path: &Path) -> Result<(), KeyError> {
        tracing::info!(
            "generating new {}-bit private key at {} using {}",
            self.bits,
            path.display(),
            self.backend.name()
        );

        // The handle is dropped before the backend writes the key.
        create_private_key_file(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::AlreadyExists {
                KeyError::PrivateKeyExists(path.to_path_buf())
            } else {
                KeyError::PrivateKeyNotCreatable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        self.backend
            .generate_private_key(path, self.bits)
            .map_err(KeyError::PrivateKeyGeneration)
    }

    fn generate_public_key(&self, private_key: &Path, public_key: &Path) -> Result<(), KeyError> {
        tracing::info!(
            "deriving public key {} from {}",
            public_key.display(),
            private_key.display()
        );

        File::open(private_key).map_err(|source| KeyError::PublicKeySourceUnreadable {
            path: private_key.to_path_buf(),
            source,
        })?;
        File::create(public_key).map_err(|source| KeyError::PublicKeyNotCreatable {
            path: public_key.to_path_buf(),
            source,
        })?;

        self.backend
            .derive_public_key(private_key, public_key)
            .map_err(KeyError::PublicKeyGeneration)
    }

    fn check_private_key(&self, path: &Path) -> Result<(), KeyError> {
        if !path.exists() {
            return Err(KeyError::PrivateKeyMissing(path.to_path_buf()));
        }
        File::open(path).map_err(|source| KeyError::PrivateKeyUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        self.backend
            .validate_key(path, KeyKind::Private)
            .map_err(KeyError::PrivateKeyInvalid)
    }

    fn check_public_key(&self, path: &Path) -> Result<(), KeyError> {
        if !path.exists() {
            return Err(KeyError::PublicKeyMissing(path.to_path_buf()));
        }
        File::open(path).map_err(|source| KeyError::PublicKeyUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        self.backend
            .validate_key(path, KeyKind::Public)
            .map_err(KeyError::PublicKeyInvalid)
    }

    fn check_keys_are_matching(&self, private_key: &Path, public_key: &Path) -> Result<(), KeyError> {
        let matching = self
            .backend
            .keys_match(private_key, public_key)
            .map_err(KeyError::KeyComparison)?;
        if matching {
            Ok(())
        } else {
            Err(KeyError::KeyMismatch)
        }
    }
}

/// Create an empty private key file, failing if it already exists.
///
/// On Unix the file is only accessible by its owner.
fn create_private_key_file(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
