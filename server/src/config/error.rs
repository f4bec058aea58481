//! Configuration errors.
//!
//! Every variant renders as one human-readable sentence naming the offending
//! value or path. The binary prints it to stderr and exits with status 1.

use std::path::PathBuf;

use crate::keys::KeyError;

/// Error returned when resolving the startup configuration fails.
#[derive(Debug)]
pub enum ConfigError {
    /// The `--port` value is not an unsigned integer.
    PortNotANumber(String),
    /// The `--port` value is outside 1-65535.
    PortOutOfRange(u64),
    /// `--private-key` was given without `--public-key`.
    MissingPublicKeyPath,
    /// `--public-key` was given without `--private-key`.
    MissingPrivateKeyPath,
    /// No `--config` was given and none of the default files exist.
    NoConfigFile { attempted: Vec<PathBuf> },
    /// The configuration file could not be read.
    ConfigFileUnreadable { path: PathBuf, source: std::io::Error },
    /// The configuration file is not valid TOML or has mistyped values.
    Parse { path: PathBuf, message: String },
    /// A `[[user]]` table has no `username`.
    MissingUsername { path: PathBuf },
    /// A `[[user]]` table has no `password`.
    MissingPassword { username: String, path: PathBuf },
    /// Resolving the RSA key pair failed.
    Key(KeyError),
    /// The resolved port is 0.
    InvalidPort,
    /// The resolved address is not an IPv4 or IPv6 literal.
    InvalidAddress(String),
    /// No private key was loaded.
    MissingPrivateKey,
    /// No public key was loaded.
    MissingPublicKey,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PortNotANumber(value) => write!(f, "Port {value} is not a number."),
            Self::PortOutOfRange(value) => {
                write!(f, "Port {value} is out of range (1-65535).")
            }
            Self::MissingPublicKeyPath => write!(
                f,
                "If you specify a private key file, you also have to specify a public key file."
            ),
            Self::MissingPrivateKeyPath => write!(
                f,
                "If you specify a public key file, you also have to specify a private key file."
            ),
            Self::NoConfigFile { attempted } => {
                write!(f, "No valid configuration file found. You can ")?;
                if !attempted.is_empty() {
                    let paths: Vec<String> = attempted
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect();
                    write!(f, "create one at {} or ", paths.join(", "))?;
                }
                write!(f, "specify your configuration with the --config option.")
            }
            Self::ConfigFileUnreadable { path, source } => write!(
                f,
                "Failed to read configuration file {}: {source}",
                path.display()
            ),
            Self::Parse { path, message } => {
                write!(f, "Parsing error in {}: {message}", path.display())
            }
            Self::MissingUsername { path } => write!(
                f,
                "Missing username in configuration file {}.",
                path.display()
            ),
            Self::MissingPassword { username, path } => write!(
                f,
                "Missing password for user {username} in configuration file {}.",
                path.display()
            ),
            Self::Key(e) => write!(f, "{e}"),
            Self::InvalidPort => write!(f, "You specified the only invalid port, which is 0."),
            Self::InvalidAddress(address) => {
                write!(f, "The address {address} seems to be invalid.")
            }
            Self::MissingPrivateKey => write!(f, "No private key specified."),
            Self::MissingPublicKey => write!(f, "No public key specified."),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigFileUnreadable { source, .. } => Some(source),
            Self::Key(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyError> for ConfigError {
    fn from(e: KeyError) -> Self {
        Self::Key(e)
    }
}
