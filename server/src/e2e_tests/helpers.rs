//! Common helpers for end-to-end tests.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{CliArgs, ConfigError, ConfigResolver, Configuration, Defaults};
use crate::keys::RustCryptoBackend;

/// A temporary installation: config directory, key directory and defaults
/// pointing into them. Removed on drop.
pub struct TestInstallation {
    dir: tempfile::TempDir,
}

impl TestInstallation {
    #[must_use]
    pub fn new() -> Self {
        #[allow(clippy::expect_used)]
        let dir = tempfile::tempdir().expect("Failed to create installation directory");
        #[allow(clippy::expect_used)]
        std::fs::create_dir_all(dir.path().join("etc")).expect("Failed to create etc");
        #[allow(clippy::expect_used)]
        std::fs::create_dir_all(dir.path().join("keys")).expect("Failed to create keys");
        Self { dir }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root().join("etc/config.toml")
    }

    #[must_use]
    pub fn default_private_key(&self) -> PathBuf {
        self.root().join("keys/private_key.pem")
    }

    #[must_use]
    pub fn default_public_key(&self) -> PathBuf {
        self.root().join("keys/public_key.pem")
    }

    #[must_use]
    pub fn defaults(&self) -> Defaults {
        Defaults {
            config_files: vec![self.config_file()],
            private_key: self.default_private_key(),
            public_key: self.default_public_key(),
            ..Defaults::default()
        }
    }

    pub fn write_config(&self, contents: &str) {
        #[allow(clippy::expect_used)]
        std::fs::write(self.config_file(), contents).expect("Failed to write config");
    }

    /// Run the resolver with the given flags (without the program name).
    pub fn resolve(&self, args: &[&str]) -> Result<Configuration, ConfigError> {
        #[allow(clippy::expect_used)]
        let cli = CliArgs::try_parse_from(std::iter::once("auth-server").chain(args.iter().copied()))
            .expect("Failed to parse flags");
        let backend = RustCryptoBackend::new();
        ConfigResolver::new(self.defaults(), &backend).resolve(&cli)
    }

    /// Sorted file names in the key directory.
    #[must_use]
    pub fn key_files(&self) -> Vec<String> {
        #[allow(clippy::expect_used)]
        let mut names: Vec<String> = std::fs::read_dir(self.root().join("keys"))
            .expect("Failed to list keys")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Render a path for use as a command-line argument.
#[must_use]
pub fn arg(path: &Path) -> &str {
    #[allow(clippy::expect_used)]
    path.to_str().expect("temporary paths are UTF-8")
}
