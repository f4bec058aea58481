//! Command-line flags.
//!
//! Values are kept as the raw strings the user typed; the resolver decides what
//! they mean. An empty value counts as "not supplied".

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::keys::{KeyBackend, OpensslBackend, RustCryptoBackend};

/// Which implementation performs key generation and validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KeyBackendKind {
    /// In-process RSA implementation.
    #[default]
    RustCrypto,
    /// The `openssl` command-line tool.
    Openssl,
}

impl KeyBackendKind {
    /// Instantiate the selected backend.
    #[must_use]
    pub fn backend(self) -> Box<dyn KeyBackend> {
        match self {
            Self::RustCrypto => Box::new(RustCryptoBackend::new()),
            Self::Openssl => Box::new(OpensslBackend::new()),
        }
    }
}

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "auth-server", version, about = "Authentication server")]
pub struct CliArgs {
    /// Load configuration from <config>.
    #[arg(long, value_name = "config", env = "AUTH_SERVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// The server will listen on port <port>.
    #[arg(short, long, value_name = "port")]
    pub port: Option<String>,

    /// The server will listen on address <address>.
    #[arg(short, long, value_name = "address")]
    pub address: Option<String>,

    /// The private RSA key file in .pem format.
    #[arg(long, value_name = "privatekey")]
    pub private_key: Option<PathBuf>,

    /// The public RSA key file in .pem format.
    #[arg(long, value_name = "publickey")]
    pub public_key: Option<PathBuf>,

    /// Implementation used to generate and check keys.
    #[arg(long, value_enum, default_value_t = KeyBackendKind::RustCrypto)]
    pub key_backend: KeyBackendKind,
}

impl CliArgs {
    pub(crate) fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref().filter(|path| !path.as_os_str().is_empty())
    }

    pub(crate) fn port_value(&self) -> Option<&str> {
        self.port.as_deref().filter(|value| !value.is_empty())
    }

    pub(crate) fn address_value(&self) -> Option<&str> {
        self.address.as_deref().filter(|value| !value.is_empty())
    }

    pub(crate) fn private_key_path(&self) -> Option<&PathBuf> {
        self.private_key
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub(crate) fn public_key_path(&self) -> Option<&PathBuf> {
        self.public_key
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}
