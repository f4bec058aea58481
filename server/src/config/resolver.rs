//! Startup configuration resolution.
//!
//! Combines command-line flags, the configuration file and [`Defaults`] into a
//! validated [`Configuration`].
//!
//! # Precedence
//!
//! 1. Command-line flags (highest priority)
//! 2. Configuration file
//! 3. Defaults (lowest priority)
//!
//! The key paths are resolved as a pair: when either key flag is given both
//! must be, and the file's key paths are then ignored.
//!
//! # Invariants
//!
//! - While merging, a port of 0 means "not supplied yet". A port still 0 after
//!   merging is rejected by validation.
//! - Validation stops at the first failure, checking port, address, private
//!   key and public key in that order.
//! - The resolver never terminates the process; errors are returned.

use std::net::IpAddr;
use std::path::PathBuf;

use super::{CliArgs, ConfigError, Configuration, Defaults, FileConfig};
use crate::auth::{User, UserRegistry};
use crate::keys::{KeyBackend, KeyMaterialManager, KeyPair};

/// Resolves the startup configuration.
pub struct ConfigResolver<'a> {
    defaults: Defaults,
    backend: &'a dyn KeyBackend,
}

/// Settings collected so far; empty address, port 0 and `None` keys are unset.
#[derive(Default)]
struct PendingConfiguration {
    address: String,
    port: u16,
    keys: Option<KeyPair>,
    users: Vec<User>,
}

impl<'a> ConfigResolver<'a> {
    #[must_use]
    pub const fn new(defaults: Defaults, backend: &'a dyn KeyBackend) -> Self {
        Self { defaults, backend }
    }

    #[must_use]
    pub const fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Resolve the configuration for the given command line.
    ///
    /// # Errors
    ///
    /// Returns the first problem found; see [`ConfigError`] for the cases.
    pub fn resolve(&self, cli: &CliArgs) -> Result<Configuration, ConfigError> {
        let mut pending = PendingConfiguration::default();

        if let Some(address) = cli.address_value() {
            pending.address = address.to_string();
        }
        if let Some(port) = cli.port_value() {
            pending.port = parse_port(port)?;
        }

        match (cli.private_key_path(), cli.public_key_path()) {
            (Some(_), None) => return Err(ConfigError::MissingPublicKeyPath),
            (None, Some(_)) => return Err(ConfigError::MissingPrivateKeyPath),
            (Some(private_key), Some(public_key)) => {
                tracing::debug!("using key pair from the command line");
                pending.keys = Some(self.key_manager().resolve(private_key, public_key)?);
            }
            (None, None) => {}
        }

        let config_path = match cli.config_path() {
            Some(path) => path.clone(),
            None => self.find_default_config_file()?,
        };
        tracing::info!("loading configuration from {}", config_path.display());
        let file = FileConfig::load(&config_path, &self.defaults)?;

        self.merge_file(&mut pending, &file)?;
        pending.validate()
    }

    const fn key_manager(&self) -> KeyMaterialManager<'a> {
        KeyMaterialManager::new(self.backend)
    }

    /// First default configuration file that exists.
    fn find_default_config_file(&self) -> Result<PathBuf, ConfigError> {
        self.defaults
            .config_files
            .iter()
            .find(|path| path.exists())
            .cloned()
            .ok_or_else(|| ConfigError::NoConfigFile {
                attempted: self.defaults.config_files.clone(),
            })
    }

    /// Fill every still-unset field from the file.
    fn merge_file(
        &self,
        pending: &mut PendingConfiguration,
        file: &FileConfig,
    ) -> Result<(), ConfigError> {
        if pending.address.is_empty() {
            pending.address.clone_from(&file.address);
        }
        if pending.port == 0 {
            pending.port = file.port;
        }
        if pending.keys.is_none() {
            pending.keys = Some(
                self.key_manager()
                    .resolve(&file.private_key, &file.public_key)?,
            );
        }

        pending.users = file.users()?;
        Ok(())
    }
}

impl PendingConfiguration {
    fn validate(self) -> Result<Configuration, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        // Zone suffixes such as `%eth0` are not accepted.
        let address: IpAddr = self
            .address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.address.clone()))?;

        let keys = self.keys.unwrap_or_default();
        if keys.private_key_pem.is_empty() {
            return Err(ConfigError::MissingPrivateKey);
        }
        if keys.public_key_pem.is_empty() {
            return Err(ConfigError::MissingPublicKey);
        }

        if self.users.is_empty() {
            tracing::warn!("There are no users in your configuration.");
        }

        Ok(Configuration::new(
            address,
            self.port,
            keys,
            UserRegistry::new(self.users),
        ))
    }
}

/// Parse a `--port` value.
fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port: u64 = value
        .parse()
        .map_err(|_| ConfigError::PortNotANumber(value.to_string()))?;

    match u16::try_from(port) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::PortOutOfRange(port)),
    }
}
