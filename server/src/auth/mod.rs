//! Authentication module.
//!
//! Users and key material that the token layer consumes once startup
//! configuration has been resolved.
//!
//! # Post-conditions
//! - Everything in this module is immutable once constructed.

pub mod signing;
pub mod user;
pub mod user_registry;

pub use signing::{SigningKeyError, SigningKeys};
pub use user::User;
pub use user_registry::UserRegistry;
