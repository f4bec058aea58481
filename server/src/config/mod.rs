//! Server configuration module.
//!
//! This module resolves the startup configuration of the authentication server
//! from command-line flags, a TOML configuration file and installation
//! defaults, and makes sure an RSA key pair is available.
//!
//! # Invariants
//!
//! - `port` is always in the valid range (1-65535)
//! - `address` is always a valid IPv4 or IPv6 address
//! - both PEM strings are non-empty and belong to one key pair
//! - a `Configuration` is never mutated after resolution

pub mod cli;
pub mod defaults;
pub mod error;
pub mod file;
pub mod resolver;

use std::net::{IpAddr, SocketAddr};

pub use cli::{CliArgs, KeyBackendKind};
pub use defaults::Defaults;
pub use error::ConfigError;
pub use file::FileConfig;
pub use resolver::ConfigResolver;

use crate::auth::{User, UserRegistry};
use crate::keys::KeyPair;

/// Resolved server configuration.
///
/// Only [`ConfigResolver`] constructs it, after every check has passed.
#[derive(Clone)]
pub struct Configuration {
    address: IpAddr,
    port: u16,
    keys: KeyPair,
    users: UserRegistry,
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("private_key", &"<redacted>")
            .field("public_key", &self.keys.public_key_pem)
            .field("users", &self.users.len())
            .finish()
    }
}

impl Configuration {
    pub(crate) const fn new(address: IpAddr, port: u16, keys: KeyPair, users: UserRegistry) -> Self {
        Self {
            address,
            port,
            keys,
            users,
        }
    }

    #[must_use]
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Address and port the server binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    /// PEM-encoded RSA private key.
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.keys.private_key_pem
    }

    /// PEM-encoded RSA public key.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.keys.public_key_pem
    }

    #[must_use]
    pub const fn users(&self) -> &UserRegistry {
        &self.users
    }

    /// Look up a configured user; see [`UserRegistry::lookup`].
    #[must_use]
    pub fn lookup_user(&self, name: &str) -> User {
        self.users.lookup(name)
    }
}
