//! Registry of configured users.
//!
//! # Invariants
//! - Users are kept in configuration file order, duplicates included.
//! - The registry is never mutated after construction.
//! - The unknown-user sentinel is never stored.

use super::User;

/// Ordered, immutable collection of configured users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRegistry {
    users: Vec<User>,
}

impl UserRegistry {
    #[must_use]
    pub const fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Look up a user by name.
    ///
    /// The first user with exactly this name wins. On a miss, returns
    /// [`User::unknown`] for the requested name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> User {
        self.users
            .iter()
            .find(|user| user.name() == name)
            .cloned()
            .unwrap_or_else(|| User::unknown(name.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, User> {
        self.users.iter()
    }
}

impl<'a> IntoIterator for &'a UserRegistry {
    type Item = &'a User;
    type IntoIter = std::slice::Iter<'a, User>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
