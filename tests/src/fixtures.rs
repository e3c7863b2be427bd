//! Key material shared by the suite and the benchmarks.
//!
//! Alice uses PKCS#8/SPKI PEM, Bob uses PKCS#1 PEM, Mallory is an outsider.

use jwe_signer::{EnvelopeService, KeyConfiguration, MapEnvironment};

/// Alice's private key (PKCS#8).
pub const ALICE_PRIVATE: &str = include_str!("../../crates/jwe-signer/tests/fixtures/alice_private.pem");
/// Alice's public key (SPKI).
pub const ALICE_PUBLIC: &str = include_str!("../../crates/jwe-signer/tests/fixtures/alice_public.pem");
/// Bob's private key (PKCS#1).
pub const BOB_PRIVATE: &str = include_str!("../../crates/jwe-signer/tests/fixtures/bob_private_pkcs1.pem");
/// Bob's public key (SPKI).
pub const BOB_PUBLIC: &str = include_str!("../../crates/jwe-signer/tests/fixtures/bob_public.pem");
/// Bob's public key (PKCS#1).
pub const BOB_PUBLIC_PKCS1: &str = include_str!("../../crates/jwe-signer/tests/fixtures/bob_public_pkcs1.pem");
/// Mallory's private key (PKCS#8).
pub const MALLORY_PRIVATE: &str = include_str!("../../crates/jwe-signer/tests/fixtures/mallory_private.pem");
/// Mallory's public key (SPKI).
pub const MALLORY_PUBLIC: &str = include_str!("../../crates/jwe-signer/tests/fixtures/mallory_public.pem");

/// Alice's service: her private key, Bob's public key.
pub fn alice() -> EnvelopeService<MapEnvironment> {
    party(ALICE_PRIVATE, BOB_PUBLIC)
}

/// Bob's service: his private key, Alice's public key.
pub fn bob() -> EnvelopeService<MapEnvironment> {
    party(BOB_PRIVATE, ALICE_PUBLIC)
}

/// Mallory's service, pretending to talk to Bob.
pub fn mallory() -> EnvelopeService<MapEnvironment> {
    party(MALLORY_PRIVATE, BOB_PUBLIC)
}

/// Service over an empty environment.
pub fn party(private_pem: &str, public_pem: &str) -> EnvelopeService<MapEnvironment> {
    EnvelopeService::with_environment(
        KeyConfiguration::new(private_pem, public_pem),
        MapEnvironment::new(),
    )
}

/// Replace the character at `pos` of segment `index` with a different
/// base64url character.
pub fn tamper_segment(compact: &str, index: usize, pos: usize) -> String {
    let mut segments: Vec<Vec<u8>> = compact.split('.').map(|s| s.as_bytes().to_vec()).collect();
    let byte = &mut segments[index][pos];
    *byte = if *byte == b'A' { b'B' } else { b'A' };
    segments
        .into_iter()
        .map(|s| String::from_utf8(s).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(".")
}
