//! Configuration file loading.
//!
//! Parses the TOML configuration file:
//!
//! ```toml
//! [server]
//! address = "0.0.0.0"
//! port = 80
//!
//! [security]
//! privateKey = "/usr/share/auth-server/keys/private_key.pem"
//! publicKey = "/usr/share/auth-server/keys/public_key.pem"
//!
//! [[user]]
//! username = "alice"
//! password = "..."
//! claims = ["admin"]
//! ```
//!
//! Settings are typed lookups: a missing setting, or one holding a value of
//! the wrong type, falls back to [`Defaults`]. Unknown keys are ignored. Only
//! malformed TOML and a port that does not fit in 16 bits are fatal.
//! User records are checked separately by [`FileConfig::users`] so that key
//! material is resolved before user errors are reported.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::Value;

use super::{ConfigError, Defaults};
use crate::auth::User;

#[derive(Debug, Default, Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    security: RawSecurity,
    #[serde(default)]
    user: Vec<RawUser>,
}

#[derive(Debug, Default, Deserialize)]
struct RawServer {
    address: Option<Value>,
    port: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSecurity {
    private_key: Option<Value>,
    public_key: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    username: Option<Value>,
    password: Option<Value>,
    claims: Option<Value>,
}

/// Settings read from one configuration file, with defaults applied.
#[derive(Debug)]
pub struct FileConfig {
    path: PathBuf,
    pub address: String,
    pub port: u16,
    pub private_key: PathBuf,
    pub public_key: PathBuf,
    users: Vec<RawUser>,
}

impl FileConfig {
    /// Read and parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// holds a `server.port` that does not fit in 16 bits.
    pub fn load(path: &Path, defaults: &Defaults) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(path, &contents, defaults)
    }

    /// Parse configuration text; `path` is only used in error messages.
    pub fn parse(path: &Path, contents: &str, defaults: &Defaults) -> Result<Self, ConfigError> {
        let raw: RawConfigFile = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: describe_parse_error(contents, &e),
        })?;

        let port = match setting(raw.server.port.as_ref(), "server.port", Value::as_integer) {
            Some(port) => u16::try_from(port).map_err(|_| ConfigError::Parse {
                path: path.to_path_buf(),
                message: format!("server.port {port} does not fit in 16 bits"),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            path: path.to_path_buf(),
            address: setting(raw.server.address.as_ref(), "server.address", Value::as_str)
                .map_or_else(|| defaults.address.clone(), str::to_string),
            port,
            private_key: setting(
                raw.security.private_key.as_ref(),
                "security.privateKey",
                Value::as_str,
            )
            .map_or_else(|| defaults.private_key.clone(), PathBuf::from),
            public_key: setting(
                raw.security.public_key.as_ref(),
                "security.publicKey",
                Value::as_str,
            )
            .map_or_else(|| defaults.public_key.clone(), PathBuf::from),
            users: raw.user,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of `[[user]]` tables in the file.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Build the user records in file order.
    ///
    /// # Errors
    ///
    /// Fails at the first table without a `username` or `password`.
    pub fn users(&self) -> Result<Vec<User>, ConfigError> {
        self.users
            .iter()
            .map(|raw| {
                let username = setting(raw.username.as_ref(), "user.username", Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::MissingUsername {
                        path: self.path.clone(),
                    })?;
                let password = setting(raw.password.as_ref(), "user.password", Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::MissingPassword {
                        username: username.clone(),
                        path: self.path.clone(),
                    })?;
                let claims = setting(raw.claims.as_ref(), "user.claims", string_array)
                    .unwrap_or_default();
                Ok(User::new(username, password, claims))
            })
            .collect()
    }
}

/// Typed lookup of an optional setting.
///
/// A value of the wrong type is logged and treated as absent.
fn setting<'v, T>(
    value: Option<&'v Value>,
    key: &str,
    typed: impl FnOnce(&'v Value) -> Option<T>,
) -> Option<T> {
    let value = value?;
    let typed = typed(value);
    if typed.is_none() {
        tracing::warn!("ignoring {key}: unexpected {} value", value.type_str());
    }
    typed
}

/// An array whose elements are all strings.
fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Render a TOML error as a single line with its position.
fn describe_parse_error(contents: &str, error: &toml::de::Error) -> String {
    let message = error.message().trim_end();
    match error.span() {
        Some(span) => {
            let (line, column) = line_and_column(contents, span.start);
            format!("line {line}, column {column}: {message}")
        }
        None => message.to_string(),
    }
}

/// One-based line and column of a byte offset.
fn line_and_column(contents: &str, offset: usize) -> (usize, usize) {
    let before = contents.get(..offset).unwrap_or(contents);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before, |newline| &before[newline + 1..])
        .chars()
        .count()
        + 1;
    (line, column)
}
