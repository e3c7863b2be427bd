//! # Envelope Errors
//!
//! Error types for key resolution and envelope operations.

use crate::domain::entities::KeyRole;
use thiserror::Error;

/// Errors raised while turning configured key material into RSA keys.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyParseError {
    /// The configured key string is empty after env substitution.
    #[error("Missing key material for {role}")]
    MissingKeyMaterial {
        /// Which configured key was empty
        role: KeyRole,
    },

    /// The key string is not a PEM block of a supported encoding.
    #[error("Invalid PEM for {role}: {reason}")]
    InvalidPem {
        /// Which configured key failed to parse
        role: KeyRole,
        /// Decoder message
        reason: String,
    },
}

/// Errors from `verify`.
///
/// Malformed input and a bad signature are separate variants so callers can
/// tell a garbled message from a forged one. Neither is retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// The text is not a JWS this service understands.
    #[error("Malformed signed envelope: {0}")]
    Malformed(String),

    /// The signature does not match the payload under the counterpart key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The counterpart public key could not be resolved.
    #[error("Verification key unavailable: {0}")]
    Key(#[from] KeyParseError),
}

/// Errors from building a canonical string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The payload bytes are not UTF-8, so only the byte form is exact.
    #[error("Payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
    NonUtf8Payload {
        /// Offset of the first invalid byte in the canonical material
        valid_up_to: usize,
    },
}

/// Errors returned by the envelope operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Encryption failed (key resolution or provider rejection).
    #[error("Encryption failed: {0}")]
    Encrypt(String),

    /// Decryption failed. Malformed input, key mismatch and tag failure all
    /// land here.
    #[error("Decryption failed: {0}")]
    Decrypt(String),

    /// Signing failed (key resolution or provider rejection).
    #[error("Signing failed: {0}")]
    Sign(String),

    /// Verification failed.
    #[error("Verification failed: {0}")]
    Verify(#[from] VerifyError),
}

impl EnvelopeError {
    /// True when the error came from a malformed signed envelope.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Verify(VerifyError::Malformed(_)))
    }

    /// True when the error came from a signature that failed to verify.
    pub fn is_invalid_signature(&self) -> bool {
        matches!(self, Self::Verify(VerifyError::InvalidSignature))
    }
}
