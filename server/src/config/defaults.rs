//! Installation defaults.
//!
//! The install directories can be overridden when building, e.g.
//! `AUTH_SERVER_CONFIG_DIR=/usr/local/etc/auth-server cargo build`.

use std::path::PathBuf;

/// Directory holding the default configuration file.
pub const DEFAULT_CONFIG_DIR: &str = match option_env!("AUTH_SERVER_CONFIG_DIR") {
    Some(dir) => dir,
    None => "/etc/auth-server",
};

/// Directory holding the default key pair.
pub const DEFAULT_KEYS_DIR: &str = match option_env!("AUTH_SERVER_KEYS_DIR") {
    Some(dir) => dir,
    None => "/usr/share/auth-server/keys",
};

/// Always-present empty file tried after the real default configuration.
#[cfg(unix)]
pub const EMPTY_CONFIG_FILE: &str = "/dev/null";

/// Values used when neither the command line nor the configuration file
/// supplies a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Configuration files tried in order when `--config` is absent.
    pub config_files: Vec<PathBuf>,
    pub address: String,
    pub port: u16,
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl Defaults {
    pub const ADDRESS: &'static str = "0.0.0.0";
    pub const PORT: u16 = 80;
    pub const CONFIG_FILE_NAME: &'static str = "config.toml";
    pub const PRIVATE_KEY_FILE_NAME: &'static str = "private_key.pem";
    pub const PUBLIC_KEY_FILE_NAME: &'static str = "public_key.pem";
}

impl Default for Defaults {
    fn default() -> Self {
        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut config_files = vec![PathBuf::from(DEFAULT_CONFIG_DIR).join(Self::CONFIG_FILE_NAME)];
        #[cfg(unix)]
        config_files.push(PathBuf::from(EMPTY_CONFIG_FILE));

        let keys_dir = PathBuf::from(DEFAULT_KEYS_DIR);
        Self {
            config_files,
            address: Self::ADDRESS.to_string(),
            port: Self::PORT,
            private_key: keys_dir.join(Self::PRIVATE_KEY_FILE_NAME),
            public_key: keys_dir.join(Self::PUBLIC_KEY_FILE_NAME),
        }
    }
}
