//! Key backend abstraction.
//!
//! This module provides a `KeyBackend` trait that abstracts over the
//! asymmetric-key operations needed at startup, allowing the server to use an
//! in-process RSA implementation in production, the `openssl` executable where
//! operators prefer it, and a fake backend in tests.
//!
//! # Design
//!
//! The trait is a minimal capability surface:
//! - Private key generation
//! - Public key derivation
//! - Structural validation of a single key file
//! - Pairing check between a private and a public key file
//!
//! Every operation works on file paths. A backend reports success or failure
//! only; callers never inspect what a backend printed.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Default RSA modulus size for freshly generated private keys.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Which half of a key pair a file is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// An RSA private key.
    Private,
    /// An RSA public key.
    Public,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Private => write!(f, "private"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Errors that can occur during backend operations.
#[derive(Debug)]
pub enum KeyBackendError {
    /// Reading or writing a key file failed.
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// An external program could not be started.
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying error.
        source: std::io::Error,
    },
    /// An external program exited unsuccessfully.
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// The exit status reported by the program.
        status: ExitStatus,
    },
    /// The key material was rejected.
    Crypto(String),
}

impl std::fmt::Display for KeyBackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Spawn { program, source } => write!(f, "cannot run {program}: {source}"),
            Self::CommandFailed { command, status } => write!(f, "`{command}` failed with {status}"),
            Self::Crypto(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for KeyBackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::Spawn { source, .. } => Some(source),
            Self::CommandFailed { .. } | Self::Crypto(_) => None,
        }
    }
}

/// Abstraction over asymmetric key operations.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `generate_private_key` writes a complete PEM private key of `bits` bits to
///   `path`, replacing the (empty) file the caller created there
/// - `derive_public_key` writes the public half of `private_key` to `public_key`
/// - `validate_key` fails for anything that is not a well-formed key of `kind`
/// - `keys_match` is `Ok(false)` only when both keys are valid but unrelated
/// - no file handle outlives the call
pub trait KeyBackend {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Generate a new RSA private key at `path`.
    fn generate_private_key(&self, path: &Path, bits: usize) -> Result<(), KeyBackendError>;

    /// Write the public key belonging to `private_key` to `public_key`.
    fn derive_public_key(&self, private_key: &Path, public_key: &Path)
    -> Result<(), KeyBackendError>;

    /// Check that `path` holds a well-formed key of the given kind.
    fn validate_key(&self, path: &Path, kind: KeyKind) -> Result<(), KeyBackendError>;

    /// Check whether `public_key` is the public half of `private_key`.
    fn keys_match(&self, private_key: &Path, public_key: &Path) -> Result<bool, KeyBackendError>;
}
