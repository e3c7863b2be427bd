//! # Inbound Ports (Driving Ports / API)
//!
//! The public surface of the envelope service. Transport layers depend on
//! this trait rather than on `EnvelopeService` so they can substitute a mock.

use crate::adapters::environment::MapEnvironment;
use crate::domain::b64;
use crate::domain::entities::{KeyConfiguration, KeyRole, VerificationResult};
use crate::domain::errors::{EnvelopeError, KeyParseError, VerifyError};
use crate::domain::jws::SignedEnvelope;
use crate::domain::keys::KeyResolver;
use parking_lot::RwLock;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::Arc;

/// Primary envelope API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait EnvelopeApi: Send + Sync {
    // =========================================================================
    // Confidentiality
    // =========================================================================

    /// Encrypt `message` for the counterpart. Returns JWE compact bytes.
    ///
    /// Output is randomized: encrypting the same message twice yields
    /// different envelopes.
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, EnvelopeError>;

    /// Decrypt a JWE (compact or flattened JSON) with the own private key.
    fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, EnvelopeError>;

    // =========================================================================
    // Authenticity
    // =========================================================================

    /// Sign `message` with the own private key. Returns JWS compact text.
    fn sign(&self, message: &[u8]) -> Result<String, EnvelopeError>;

    /// Verify a JWS (compact or flattened JSON) against the counterpart key.
    fn verify(&self, signature: &str) -> Result<VerificationResult, EnvelopeError>;

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace the key configuration. Calls already in flight keep the
    /// snapshot they started with.
    fn set_configuration(&self, configuration: KeyConfiguration);

    /// Current key configuration snapshot.
    fn configuration(&self) -> Arc<KeyConfiguration>;

    /// Parsed own private key.
    fn private_key(&self) -> Result<RsaPrivateKey, KeyParseError>;

    /// Parsed counterpart public key.
    fn public_key(&self) -> Result<RsaPublicKey, KeyParseError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Mock envelope API for testing transport code without real keys.
///
/// `encrypt` and `decrypt` pass bytes through unchanged. `sign` emits an
/// unsigned three-segment envelope which `verify` decodes without any key.
/// Key accessors parse the configured PEM text with no placeholder lookup.
#[derive(Debug, Default)]
pub struct MockEnvelopeApi {
    /// Should fail?
    pub should_fail: bool,
    configuration: RwLock<Arc<KeyConfiguration>>,
}

impl MockEnvelopeApi {
    const UNSIGNED_HEADER: &'static [u8] = br#"{"alg":"none"}"#;

    /// Mock that fails every operation.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn check(&self, wrap: fn(String) -> EnvelopeError) -> Result<(), EnvelopeError> {
        if self.should_fail {
            return Err(wrap("mock failure".to_string()));
        }
        Ok(())
    }

    fn resolver() -> KeyResolver<MapEnvironment> {
        KeyResolver::new(MapEnvironment::new())
    }
}

impl EnvelopeApi for MockEnvelopeApi {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        self.check(EnvelopeError::Encrypt)?;
        Ok(message.to_vec())
    }

    fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        self.check(EnvelopeError::Decrypt)?;
        Ok(envelope.to_vec())
    }

    fn sign(&self, message: &[u8]) -> Result<String, EnvelopeError> {
        self.check(EnvelopeError::Sign)?;
        Ok(format!(
            "{}.{}.",
            b64::encode(Self::UNSIGNED_HEADER),
            b64::encode(message)
        ))
    }

    fn verify(&self, signature: &str) -> Result<VerificationResult, EnvelopeError> {
        if self.should_fail {
            return Err(VerifyError::InvalidSignature.into());
        }
        let envelope = SignedEnvelope::parse(signature)?;
        let data = b64::decode(envelope.payload())
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;

        Ok(VerificationResult::new(
            envelope.payload().to_string(),
            envelope.protected().to_string(),
            envelope.signature().to_string(),
            envelope.to_json(),
            envelope.to_compact(),
            (!envelope.payload().is_empty()).then_some(data),
        ))
    }

    fn set_configuration(&self, configuration: KeyConfiguration) {
        *self.configuration.write() = Arc::new(configuration);
    }

    fn configuration(&self) -> Arc<KeyConfiguration> {
        Arc::clone(&self.configuration.read())
    }

    fn private_key(&self) -> Result<RsaPrivateKey, KeyParseError> {
        if self.should_fail {
            return Err(KeyParseError::MissingKeyMaterial {
                role: KeyRole::OwnPrivate,
            });
        }
        Self::resolver().private_key(&self.configuration())
    }

    fn public_key(&self) -> Result<RsaPublicKey, KeyParseError> {
        if self.should_fail {
            return Err(KeyParseError::MissingKeyMaterial {
                role: KeyRole::CounterpartPublic,
            });
        }
        Self::resolver().public_key(&self.configuration())
    }
}
