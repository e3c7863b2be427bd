//! # JWE Signer - Bilateral Message Envelopes
//!
//! Two parties each hold an RSA key pair and know the other's public key.
//! Outbound messages are signed with the own private key and encrypted for
//! the counterpart; inbound messages are decrypted with the own private key
//! and verified against the counterpart's public key.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): key resolution, JOSE codecs, canonical payloads
//! - **Ports Layer** (`ports/`): `EnvelopeApi` (inbound), `EnvironmentSource` (outbound)
//! - **Adapters** (`adapters/`): environment lookups
//! - **Service Layer** (`service.rs`): `EnvelopeService` over a swappable key snapshot
//!
//! ## Algorithms
//!
//! | Envelope | Algorithm | Serialization |
//! |----------|-----------|---------------|
//! | Confidentiality | RSA-OAEP-256 key wrap + A256GCM | JWE compact (5 segments) |
//! | Authenticity | RS256 (RSASSA-PKCS1-v1_5, SHA-256) | JWS compact (3 segments) |
//!
//! ## Exchange Flow
//!
//! ```text
//! REQUEST   client: sign(own priv) -> encrypt(server pub)
//!           server: decrypt(own priv) -> verify(client pub)
//! RESPONSE  server: sign(own priv) -> encrypt(client pub)
//!           client: decrypt(own priv) -> verify(server pub)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::environment::{MapEnvironment, ProcessEnvironment};
pub use config::EnvelopeConfig;
pub use domain::entities::{KeyConfiguration, KeyRole, SigningContext, VerificationResult};
pub use domain::errors::{EnvelopeError, FormatError, KeyParseError, VerifyError};
pub use domain::keys::KeyResolver;
pub use domain::payload::{CanonicalPayload, PayloadFormatter};
pub use ports::inbound::{EnvelopeApi, MockEnvelopeApi};
pub use ports::outbound::EnvironmentSource;
pub use service::EnvelopeService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
