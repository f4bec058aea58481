//! Key backend that drives the `openssl` command-line tool.
//!
//! Arguments are passed straight to the program, never through a shell, so
//! paths containing spaces or quotes are safe. The exit status is the only
//! signal used; output is discarded except for the pairing check, which
//! compares the two public-key renderings byte for byte.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use super::backend::{KeyBackend, KeyBackendError, KeyKind};

/// Key backend that shells out to `openssl`.
#[derive(Debug, Clone)]
pub struct OpensslBackend {
    program: PathBuf,
}

impl Default for OpensslBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OpensslBackend {
    /// Name of the executable looked up on `PATH` by default.
    pub const DEFAULT_PROGRAM: &'static str = "openssl";

    /// Create a backend that runs `openssl` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(Self::DEFAULT_PROGRAM)
    }

    /// Create a backend that runs the given executable.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check whether the configured executable can be started at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    fn command(&self, args: &[&OsStr]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args).stdin(Stdio::null());
        command
    }

    fn describe(&self, args: &[&OsStr]) -> String {
        let mut line = OsString::from(self.program.as_os_str());
        for arg in args {
            line.push(" ");
            line.push(arg);
        }
        line.to_string_lossy().into_owned()
    }

    fn spawn_error(&self, source: std::io::Error) -> KeyBackendError {
        KeyBackendError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }

    /// Run a command, discarding its output.
    fn run(&self, args: &[&OsStr]) -> Result<(), KeyBackendError> {
        tracing::debug!("running {}", self.describe(args));
        let status = self
            .command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(())
        } else {
            Err(KeyBackendError::CommandFailed {
                command: self.describe(args),
                status,
            })
        }
    }

    /// Run a command and capture its standard output.
    fn capture(&self, args: &[&OsStr]) -> Result<Vec<u8>, KeyBackendError> {
        tracing::debug!("running {}", self.describe(args));
        let Output { status, stdout, .. } = self
            .command(args)
            .stderr(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(stdout)
        } else {
            Err(KeyBackendError::CommandFailed {
                command: self.describe(args),
                status,
            })
        }
    }
}

impl KeyBackend for OpensslBackend {
    fn name(&self) -> &'static str {
        "openssl"
    }

    fn generate_private_key(&self, path: &Path, bits: usize) -> Result<(), KeyBackendError> {
        let key_option = format!("rsa_keygen_bits:{bits}");
        self.run(&[
            OsStr::new("genpkey"),
            OsStr::new("-algorithm"),
            OsStr::new("RSA"),
            OsStr::new("-out"),
            path.as_os_str(),
            OsStr::new("-pkeyopt"),
            OsStr::new(&key_option),
        ])
    }

    fn derive_public_key(
        &self,
        private_key: &Path,
        public_key: &Path,
    ) -> Result<(), KeyBackendError> {
        self.run(&[
            OsStr::new("rsa"),
            OsStr::new("-pubout"),
            OsStr::new("-in"),
            private_key.as_os_str(),
            OsStr::new("-out"),
            public_key.as_os_str(),
        ])
    }

    fn validate_key(&self, path: &Path, kind: KeyKind) -> Result<(), KeyBackendError> {
        match kind {
            KeyKind::Private => self.run(&[
                OsStr::new("rsa"),
                OsStr::new("-in"),
                path.as_os_str(),
                OsStr::new("-check"),
                OsStr::new("-noout"),
            ]),
            KeyKind::Public => self.run(&[
                OsStr::new("pkey"),
                OsStr::new("-inform"),
                OsStr::new("PEM"),
                OsStr::new("-pubin"),
                OsStr::new("-in"),
                path.as_os_str(),
                OsStr::new("-noout"),
            ]),
        }
    }

    fn keys_match(&self, private_key: &Path, public_key: &Path) -> Result<bool, KeyBackendError> {
        let derived = self.capture(&[
            OsStr::new("rsa"),
            OsStr::new("-in"),
            private_key.as_os_str(),
            OsStr::new("-outform"),
            OsStr::new("PEM"),
            OsStr::new("-pubout"),
        ])?;
        let on_disk = self.capture(&[
            OsStr::new("pkey"),
            OsStr::new("-inform"),
            OsStr::new("PEM"),
            OsStr::new("-pubin"),
            OsStr::new("-in"),
            public_key.as_os_str(),
        ])?;
        Ok(derived == on_disk)
    }
}
