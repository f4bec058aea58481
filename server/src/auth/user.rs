//! User records loaded from the configuration file.
//!
//! # Invariants
//! - A `User` is never mutated after construction.
//! - The unknown-user sentinel has an empty password record and no claims.
//! - Only [`User::unknown`] builds a user that reports itself as unknown; a
//!   configured user with an empty password is still a known user.

/// A configured user.
///
/// The password record is opaque credential material (a hash or a secret);
/// it is stored exactly as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    name: String,
    password_record: String,
    claims: Vec<String>,
    known: bool,
}

impl User {
    /// Create a user record.
    #[must_use]
    pub const fn new(name: String, password_record: String, claims: Vec<String>) -> Self {
        Self {
            name,
            password_record,
            claims,
            known: true,
        }
    }

    /// Create the sentinel returned when a lookup misses.
    ///
    /// It carries the requested name, no credentials and no claims, so any
    /// credential check against it fails.
    #[must_use]
    pub const fn unknown(name: String) -> Self {
        Self {
            name,
            password_record: String::new(),
            claims: Vec::new(),
            known: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn password_record(&self) -> &str {
        &self.password_record
    }

    /// Claims in configuration file order.
    #[must_use]
    pub fn claims(&self) -> &[String] {
        &self.claims
    }

    #[must_use]
    pub fn has_claim(&self, claim: &str) -> bool {
        self.claims.iter().any(|c| c == claim)
    }

    /// Whether this is the sentinel for a name that is not configured.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        !self.known
    }
}
