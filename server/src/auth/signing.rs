//! RS256 signing keys derived from the resolved configuration.
//!
//! Converts the loaded PEM pair into the key types the token layer uses.
//!
//! # Pre-conditions
//! - The PEM pair has passed key material resolution.
//!
//! # Post-conditions
//! - Both keys are accepted by `jsonwebtoken` for RS256.

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::config::Configuration;

/// Error returned when the PEM pair cannot be used for RS256.
#[derive(Debug)]
pub enum SigningKeyError {
    /// The private key is not a usable RS256 signing key.
    InvalidPrivateKey(String),
    /// The public key is not a usable RS256 verification key.
    InvalidPublicKey(String),
}

impl std::fmt::Display for SigningKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrivateKey(reason) => {
                write!(f, "private key cannot be used for RS256 signing: {reason}")
            }
            Self::InvalidPublicKey(reason) => {
                write!(f, "public key cannot be used for RS256 verification: {reason}")
            }
        }
    }
}

impl std::error::Error for SigningKeyError {}

/// RS256 key pair ready for token signing and verification.
#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys").finish_non_exhaustive()
    }
}

impl SigningKeys {
    /// Build signing keys from PEM text.
    ///
    /// # Errors
    /// Returns `SigningKeyError` naming the half that was rejected.
    pub fn from_pem(private_key_pem: &str, public_key_pem: &str) -> Result<Self, SigningKeyError> {
        let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| SigningKeyError::InvalidPrivateKey(e.to_string()))?;
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| SigningKeyError::InvalidPublicKey(e.to_string()))?;

        Ok(Self { encoding, decoding })
    }

    /// Build signing keys from a resolved configuration.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, SigningKeyError> {
        Self::from_pem(configuration.private_key(), configuration.public_key())
    }

    #[must_use]
    pub const fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}
