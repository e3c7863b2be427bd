//! # Envelope Service
//!
//! Application service that implements the `EnvelopeApi` trait.
//!
//! ## Architecture
//!
//! - Implements the inbound port (`EnvelopeApi`)
//! - Resolves keys through `KeyResolver`, which reads the outbound
//!   `EnvironmentSource` port
//! - Delegates the JOSE work to `domain::jwe` and `domain::jws`
//!
//! ## Configuration Swaps
//!
//! The key configuration lives behind a lock as an `Arc` snapshot. Each
//! operation clones the `Arc` once at entry, so a concurrent
//! `set_configuration` never mixes old and new keys inside one call.

use crate::adapters::environment::ProcessEnvironment;
use crate::domain::entities::{KeyConfiguration, VerificationResult};
use crate::domain::errors::{EnvelopeError, KeyParseError, VerifyError};
use crate::domain::jwe::{self, EncryptedEnvelope};
use crate::domain::jws::{self, SignedEnvelope};
use crate::domain::keys::KeyResolver;
use crate::ports::inbound::EnvelopeApi;
use crate::ports::outbound::EnvironmentSource;
use parking_lot::RwLock;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::Arc;
use tracing::debug;

/// Envelope service for one side of a bilateral exchange.
pub struct EnvelopeService<E: EnvironmentSource = ProcessEnvironment> {
    configuration: RwLock<Arc<KeyConfiguration>>,
    resolver: KeyResolver<E>,
}

impl EnvelopeService<ProcessEnvironment> {
    /// Create a service that resolves key placeholders from the process
    /// environment.
    pub fn new(configuration: KeyConfiguration) -> Self {
        Self::with_environment(configuration, ProcessEnvironment)
    }
}

impl<E: EnvironmentSource> EnvelopeService<E> {
    /// Create a service with a custom environment source.
    pub fn with_environment(configuration: KeyConfiguration, env: E) -> Self {
        Self {
            configuration: RwLock::new(Arc::new(configuration)),
            resolver: KeyResolver::new(env),
        }
    }

    /// The resolver this service parses keys with.
    pub fn resolver(&self) -> &KeyResolver<E> {
        &self.resolver
    }

    fn snapshot(&self) -> Arc<KeyConfiguration> {
        Arc::clone(&self.configuration.read())
    }
}

impl<E: EnvironmentSource> EnvelopeApi for EnvelopeService<E> {
    fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let config = self.snapshot();
        let public_key = self
            .resolver
            .public_key(&config)
            .map_err(|e| EnvelopeError::Encrypt(e.to_string()))?;

        let compact = jwe::seal(&public_key, message)?.to_compact()?;

        debug!(plaintext_len = message.len(), envelope_len = compact.len(), "message encrypted");
        Ok(compact.into_bytes())
    }

    fn decrypt(&self, envelope: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let config = self.snapshot();
        let private_key = self
            .resolver
            .private_key(&config)
            .map_err(|e| EnvelopeError::Decrypt(e.to_string()))?;

        let text = std::str::from_utf8(envelope)
            .map_err(|e| EnvelopeError::Decrypt(format!("unable to parse message: {e}")))?;
        let parsed = EncryptedEnvelope::parse(text)?;
        let plaintext = jwe::open(&private_key, &parsed)?;

        debug!(envelope_len = envelope.len(), plaintext_len = plaintext.len(), "message decrypted");
        Ok(plaintext)
    }

    fn sign(&self, message: &[u8]) -> Result<String, EnvelopeError> {
        let config = self.snapshot();
        let private_key = self
            .resolver
            .private_key(&config)
            .map_err(|e| EnvelopeError::Sign(e.to_string()))?;

        let compact = jws::sign(&private_key, message)?.to_compact();

        debug!(message_len = message.len(), "message signed");
        Ok(compact)
    }

    fn verify(&self, signature: &str) -> Result<VerificationResult, EnvelopeError> {
        let config = self.snapshot();
        let envelope = SignedEnvelope::parse(signature)?;
        let public_key = self.resolver.public_key(&config).map_err(VerifyError::Key)?;

        let data = jws::verify(&public_key, &envelope)?;

        let result = VerificationResult::new(
            envelope.payload().to_string(),
            envelope.protected().to_string(),
            envelope.signature().to_string(),
            envelope.to_json(),
            envelope.to_compact(),
            (!envelope.payload().is_empty()).then_some(data),
        );

        debug!(payload_len = result.data().map_or(0, <[u8]>::len), "signature verified");
        Ok(result)
    }

    fn set_configuration(&self, configuration: KeyConfiguration) {
        *self.configuration.write() = Arc::new(configuration);
        debug!("key configuration replaced");
    }

    fn configuration(&self) -> Arc<KeyConfiguration> {
        self.snapshot()
    }

    fn private_key(&self) -> Result<RsaPrivateKey, KeyParseError> {
        self.resolver.private_key(&self.snapshot())
    }

    fn public_key(&self) -> Result<RsaPublicKey, KeyParseError> {
        self.resolver.public_key(&self.snapshot())
    }
}
