// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

// Startup sequence:
// 1. Command-line flags are parsed
// 2. A key pair given on the command line is resolved right away
// 3. The configuration file (explicit or first existing default) is loaded
// 4. Fields still unset are filled from the file, then from defaults
// 5. The key pair from the file or defaults is resolved if none was given
// 6. Users are read and the result is validated
//
// Key resolution: generate private key if missing, validate it, derive public
// key if missing, validate it, check that both belong together, load both.

pub mod auth;
pub mod config;
pub mod keys;

#[cfg(test)]
mod testing;

pub use auth::{SigningKeys, User, UserRegistry};
pub use config::{CliArgs, ConfigError, ConfigResolver, Configuration, Defaults};
pub use keys::{KeyBackend, KeyMaterialManager, OpensslBackend, RustCryptoBackend};
