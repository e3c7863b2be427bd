//! # Domain Entities
//!
//! Key configuration, signing context and verification result.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

// =============================================================================
// Key Configuration
// =============================================================================

/// Which configured key a value or error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// Own private key: signs outbound and decrypts inbound messages
    OwnPrivate,
    /// Counterpart public key: encrypts outbound and verifies inbound messages
    CounterpartPublic,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnPrivate => f.write_str("own private key"),
            Self::CounterpartPublic => f.write_str("counterpart public key"),
        }
    }
}

/// PEM key material for one side of a bilateral exchange.
///
/// Both strings may embed `${NAME}` or `$NAME` environment references. They
/// are resolved each time a key is parsed, not when the configuration is
/// built. The strings are wiped when the configuration is dropped.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyConfiguration {
    own_private_key: String,
    counterpart_public_key: String,
}

impl KeyConfiguration {
    /// Create a configuration from both PEM strings.
    pub fn new(own_private_key: impl Into<String>, counterpart_public_key: impl Into<String>) -> Self {
        Self {
            own_private_key: own_private_key.into(),
            counterpart_public_key: counterpart_public_key.into(),
        }
    }

    /// Set the own private key (PKCS#1 or PKCS#8 PEM).
    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.own_private_key = pem.into();
        self
    }

    /// Set the counterpart public key (SPKI or PKCS#1 PEM).
    pub fn with_public_key(mut self, pem: impl Into<String>) -> Self {
        self.counterpart_public_key = pem.into();
        self
    }

    /// Configured private key text, before env substitution.
    pub fn own_private_key(&self) -> &str {
        &self.own_private_key
    }

    /// Configured public key text, before env substitution.
    pub fn counterpart_public_key(&self) -> &str {
        &self.counterpart_public_key
    }

    /// Raw text for the given role.
    pub fn material(&self, role: KeyRole) -> &str {
        match role {
            KeyRole::OwnPrivate => &self.own_private_key,
            KeyRole::CounterpartPublic => &self.counterpart_public_key,
        }
    }
}

impl fmt::Debug for KeyConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyConfiguration")
            .field("own_private_key", &"<redacted>")
            .field("counterpart_public_key_len", &self.counterpart_public_key.len())
            .finish()
    }
}

// =============================================================================
// Signing Context
// =============================================================================

/// Inputs of the canonical signing string.
///
/// ```text
/// auth_token | request_id | timestamp | target | payload
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SigningContext {
    /// Caller credential placed first in the string
    pub auth_token: String,
    /// Unique request identifier; a UUID v4 is generated when empty
    pub request_id: String,
    /// Seconds since epoch; the current time is used when not positive
    pub timestamp: i64,
    /// HTTP method or verb. Carried for the caller, never emitted.
    pub method: String,
    /// URI or resource identifier
    pub target: String,
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Field separator; the formatter default applies when empty
    pub separator: String,
}

impl SigningContext {
    /// Empty context. Request id and timestamp are filled in at format time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with a fresh UUID v4 request id and the current timestamp.
    pub fn fresh() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            ..Self::default()
        }
    }

    /// Set the auth token.
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = auth_token.into();
        self
    }

    /// Set the request id.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Set the timestamp (epoch seconds).
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Set the target URI.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the payload bytes.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Set the separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

// =============================================================================
// Verification Result
// =============================================================================

/// Decoded output of a successful `verify`.
///
/// `data` is the recovered plaintext. The other fields are provenance: the
/// base64url segments as carried in the envelope and both serializations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    payload: String,
    protected: String,
    signature: String,
    full: String,
    compact: String,
    data: Option<Vec<u8>>,
}

impl VerificationResult {
    pub(crate) fn new(
        payload: String,
        protected: String,
        signature: String,
        full: String,
        compact: String,
        data: Option<Vec<u8>>,
    ) -> Self {
        debug_assert_eq!(payload.is_empty(), data.is_none());
        Self {
            payload,
            protected,
            signature,
            full,
            compact,
            data,
        }
    }

    /// Base64url payload segment.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Base64url protected header segment.
    pub fn protected(&self) -> &str {
        &self.protected
    }

    /// Base64url signature segment.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Flattened JSON serialization.
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Compact serialization.
    pub fn compact(&self) -> &str {
        &self.compact
    }

    /// Decoded plaintext; `None` only when the payload segment is empty.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Plaintext as UTF-8, if it is valid UTF-8.
    pub fn data_as_str(&self) -> Option<&str> {
        self.data().and_then(|d| std::str::from_utf8(d).ok())
    }

    /// Consume the result and return the plaintext (empty for an empty payload).
    pub fn into_data(self) -> Vec<u8> {
        self.data.unwrap_or_default()
    }
}
