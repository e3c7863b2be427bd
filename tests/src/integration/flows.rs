//! # Bilateral Exchange Flows
//!
//! Alice is the remote client, Bob is the API owner.
//!
//! ```text
//! REQUEST   1. Alice signs the request with her private key
//!           2. Alice encrypts the signed request with Bob's public key
//!           3. Bob decrypts with his private key
//!           4. Bob verifies with Alice's public key
//! RESPONSE  5-8. The same, with the roles swapped
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{self, ALICE_PRIVATE, BOB_PUBLIC, BOB_PUBLIC_PKCS1};
    use jwe_signer::{
        EnvelopeApi, EnvelopeConfig, EnvelopeService, KeyConfiguration, MapEnvironment,
        PayloadFormatter, SigningContext,
    };
    use std::sync::Arc;

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Sign then encrypt, as a sender does.
    fn seal(sender: &dyn EnvelopeApi, message: &[u8]) -> Vec<u8> {
        let signed = sender.sign(message).unwrap();
        sender.encrypt(signed.as_bytes()).unwrap()
    }

    /// Decrypt then verify, as a receiver does.
    fn open(receiver: &dyn EnvelopeApi, envelope: &[u8]) -> Vec<u8> {
        let signed = receiver.decrypt(envelope).unwrap();
        let signed = String::from_utf8(signed).unwrap();
        receiver.verify(&signed).unwrap().into_data()
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    #[test]
    fn test_request_response_round_trip() {
        let alice = fixtures::alice();
        let bob = fixtures::bob();

        // Steps 1-4
        let request = seal(&alice, br#"{"action":"transfer","amount":10}"#);
        assert_eq!(open(&bob, &request), br#"{"action":"transfer","amount":10}"#);

        // Steps 5-8
        let response = seal(&bob, br#"{"status":"ok"}"#);
        assert_eq!(open(&alice, &response), br#"{"status":"ok"}"#);
    }

    #[test]
    fn test_sender_cannot_open_own_request() {
        let alice = fixtures::alice();
        let request = seal(&alice, b"for bob");

        // Alice encrypted for Bob; her own private key does not unwrap it.
        assert!(alice.decrypt(&request).is_err());
    }

    #[test]
    fn test_many_messages() {
        let alice = fixtures::alice();
        let bob = fixtures::bob();

        for i in 1..15 {
            let payload = format!("test message: {}", "lorem ipsum dolor sit amet ".repeat(i));
            let request = seal(&alice, payload.as_bytes());
            assert_eq!(open(&bob, &request), payload.as_bytes());
        }
    }

    #[test]
    fn test_canonical_payload_signed_and_verified() {
        let alice = fixtures::alice();
        let bob = fixtures::bob();
        let formatter = PayloadFormatter::with_separator("|");

        let body = br#"{"amount":10}"#.to_vec();
        let canonical = formatter.format_resolved(
            SigningContext::new()
                .with_auth_token("api-key-123")
                .with_method("POST")
                .with_target("/v1/transfers")
                .with_payload(body.clone()),
        );

        // Alice sends the canonical string's signature plus the context.
        let signature = alice.sign(&canonical.material).unwrap();

        // Bob rebuilds the canonical string from the received context.
        let rebuilt = formatter
            .format(
                &SigningContext::new()
                    .with_auth_token("api-key-123")
                    .with_request_id(canonical.context.request_id.clone())
                    .with_timestamp(canonical.context.timestamp)
                    .with_target("/v1/transfers")
                    .with_payload(body),
            )
            .unwrap();
        let verified = bob.verify(&signature).unwrap();

        assert_eq!(verified.data_as_str(), Some(rebuilt.as_str()));
    }

    #[test]
    fn test_binary_canonical_payload_signature_is_exact() {
        let alice = fixtures::alice();
        let bob = fixtures::bob();
        let formatter = PayloadFormatter::new();
        let context = |payload: Vec<u8>| {
            SigningContext::new()
                .with_auth_token("api-key-123")
                .with_request_id("req-1")
                .with_timestamp(1_700_000_000)
                .with_payload(payload)
        };

        let signed = formatter.format_bytes(&context(vec![b'x', 0xff]));
        let other = formatter.format_bytes(&context(vec![b'x', 0xfe]));
        let signature = alice.sign(&signed).unwrap();
        let verified = bob.verify(&signature).unwrap();

        assert_eq!(verified.data(), Some(signed.as_slice()));
        assert_ne!(verified.data(), Some(other.as_slice()));
    }

    #[test]
    fn test_pkcs1_public_key_for_counterpart() {
        let alice = fixtures::party(ALICE_PRIVATE, BOB_PUBLIC_PKCS1);
        let bob = fixtures::bob();

        let request = seal(&alice, b"pkcs1 counterpart key");
        assert_eq!(open(&bob, &request), b"pkcs1 counterpart key");
    }

    #[test]
    fn test_keys_from_environment_references() -> anyhow::Result<()> {
        let env = MapEnvironment::new()
            .with_var("ENVELOPE_PRIVATE_KEY", "${ALICE_VAULT_KEY}")
            .with_var("ENVELOPE_PUBLIC_KEY", BOB_PUBLIC)
            .with_var("ALICE_VAULT_KEY", ALICE_PRIVATE);

        let config = EnvelopeConfig::from_source(&env);
        let alice = EnvelopeService::with_environment(config.keys, env);
        let bob = fixtures::bob();

        let signed = alice.sign(b"configured from env")?;
        let request = alice.encrypt(signed.as_bytes())?;
        let received = String::from_utf8(bob.decrypt(&request)?)?;
        let verified = bob.verify(&received)?;

        assert_eq!(verified.data_as_str(), Some("configured from env"));
        Ok(())
    }

    #[test]
    fn test_rotate_counterpart_key() {
        let alice = fixtures::alice();
        let mallory = fixtures::mallory();

        // Alice switches to talking with Mallory.
        alice.set_configuration(KeyConfiguration::new(ALICE_PRIVATE, fixtures::MALLORY_PUBLIC));
        let envelope = alice.encrypt(b"now for mallory").unwrap();

        mallory.set_configuration(KeyConfiguration::new(
            fixtures::MALLORY_PRIVATE,
            fixtures::ALICE_PUBLIC,
        ));
        assert_eq!(mallory.decrypt(&envelope).unwrap(), b"now for mallory");
        assert!(fixtures::bob().decrypt(&envelope).is_err());
    }

    #[test]
    fn test_shared_service_across_threads() {
        let bob: Arc<dyn EnvelopeApi> = Arc::new(fixtures::bob());
        let requests: Vec<Vec<u8>> = (0..8)
            .map(|i| seal(&fixtures::alice(), format!("request {i}").as_bytes()))
            .collect();

        let handles: Vec<_> = requests
            .into_iter()
            .enumerate()
            .map(|(i, request)| {
                let bob = Arc::clone(&bob);
                std::thread::spawn(move || {
                    assert_eq!(open(bob.as_ref(), &request), format!("request {i}").as_bytes());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
