//! Test support: a fake key backend and shared RSA fixtures.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::sync::OnceLock;

use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

use crate::keys::{KeyBackend, KeyBackendError, KeyKind};

pub const FIXTURE_PRIVATE_KEY_FILE: &str = "private_key.pem";
pub const FIXTURE_PUBLIC_KEY_FILE: &str = "public_key.pem";

const FAKE_PRIVATE_PREFIX: &str = "fake-private-key:";
const FAKE_PUBLIC_PREFIX: &str = "fake-public-key:";

static FIXTURE_KEY_PAIR: OnceLock<(String, String)> = OnceLock::new();
static OTHER_FIXTURE_KEY_PAIR: OnceLock<(String, String)> = OnceLock::new();

fn generate_pem_pair() -> (String, String) {
    let mut rng = rand::thread_rng();
    #[allow(clippy::expect_used)]
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate fixture key");
    #[allow(clippy::expect_used)]
    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("failed to encode fixture private key")
        .as_str()
        .to_owned();
    #[allow(clippy::expect_used)]
    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("failed to encode fixture public key");
    (private_pem, public_pem)
}

/// A 2048-bit key pair generated once per test binary.
pub fn fixture_key_pair() -> (&'static str, &'static str) {
    let (private_pem, public_pem) = FIXTURE_KEY_PAIR.get_or_init(generate_pem_pair);
    (private_pem.as_str(), public_pem.as_str())
}

/// A second, unrelated key pair for mismatch tests.
pub fn other_fixture_key_pair() -> (&'static str, &'static str) {
    let (private_pem, public_pem) = OTHER_FIXTURE_KEY_PAIR.get_or_init(generate_pem_pair);
    (private_pem.as_str(), public_pem.as_str())
}

/// Key backend that writes tagged text files instead of real keys.
///
/// A private key file holds `fake-private-key:<id>` and the public key derived
/// from it holds `fake-public-key:<id>`; two files match when the ids agree.
/// Every call is recorded so tests can assert on ordering.
#[derive(Default)]
pub struct FakeKeyBackend {
    calls: RefCell<Vec<String>>,
    next_id: Cell<u64>,
    fail_generation: bool,
}

impl FakeKeyBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose private key generation always fails.
    #[must_use]
    pub fn failing_generation() -> Self {
        Self {
            fail_generation: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }

    /// Write a fake private key with the given id, as if generated earlier.
    pub fn write_private_key(path: &Path, id: u64) {
        #[allow(clippy::expect_used)]
        std::fs::write(path, format!("{FAKE_PRIVATE_PREFIX}{id}")).expect("write fake private key");
    }

    /// Write a fake public key with the given id, as if derived earlier.
    pub fn write_public_key(path: &Path, id: u64) {
        #[allow(clippy::expect_used)]
        std::fs::write(path, format!("{FAKE_PUBLIC_PREFIX}{id}")).expect("write fake public key");
    }

    fn read_id(path: &Path, prefix: &str) -> Result<String, KeyBackendError> {
        let contents = std::fs::read_to_string(path).map_err(|source| KeyBackendError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents
            .strip_prefix(prefix)
            .map(str::to_string)
            .ok_or_else(|| KeyBackendError::Crypto(format!("{} is not a fake key", path.display())))
    }

    fn write(path: &Path, contents: &str) -> Result<(), KeyBackendError> {
        std::fs::write(path, contents).map_err(|source| KeyBackendError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl KeyBackend for FakeKeyBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn generate_private_key(&self, path: &Path, _bits: usize) -> Result<(), KeyBackendError> {
        self.record("generate");
        if self.fail_generation {
            return Err(KeyBackendError::Crypto("injected generation failure".to_string()));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Self::write(path, &format!("{FAKE_PRIVATE_PREFIX}{id}"))
    }

    fn derive_public_key(&self, private_key: &Path, public_key: &Path) -> Result<(), KeyBackendError> {
        self.record("derive");
        let id = Self::read_id(private_key, FAKE_PRIVATE_PREFIX)?;
        Self::write(public_key, &format!("{FAKE_PUBLIC_PREFIX}{id}"))
    }

    fn validate_key(&self, path: &Path, kind: KeyKind) -> Result<(), KeyBackendError> {
        self.record(&format!("validate {kind}"));
        let prefix = match kind {
            KeyKind::Private => FAKE_PRIVATE_PREFIX,
            KeyKind::Public => FAKE_PUBLIC_PREFIX,
        };
        Self::read_id(path, prefix).map(|_| ())
    }

    fn keys_match(&self, private_key: &Path, public_key: &Path) -> Result<bool, KeyBackendError> {
        self.record("match");
        let private_id = Self::read_id(private_key, FAKE_PRIVATE_PREFIX)?;
        let public_id = Self::read_id(public_key, FAKE_PUBLIC_PREFIX)?;
        Ok(private_id == public_id)
    }
}
