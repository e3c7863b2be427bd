//! # Round-Trip Properties
//!
//! Private-key RSA operations are slow in debug builds, so case counts
//! stay small.

#[cfg(test)]
mod tests {
    use crate::fixtures;
    use jwe_signer::{EnvelopeApi, PayloadFormatter, SigningContext};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_decrypt_inverts_encrypt(message in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let envelope = fixtures::alice().encrypt(&message).unwrap();
            prop_assert_eq!(fixtures::bob().decrypt(&envelope).unwrap(), message);
        }

        #[test]
        fn prop_verify_recovers_signed_data(message in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let signature = fixtures::alice().sign(&message).unwrap();
            let result = fixtures::bob().verify(&signature).unwrap();
            prop_assert_eq!(result.data().is_some(), !message.is_empty());
            prop_assert_eq!(result.into_data(), message);
        }
    }

    proptest! {
        #[test]
        fn prop_format_deterministic_with_explicit_values(
            auth in "[a-zA-Z0-9]{0,32}",
            request_id in "[a-f0-9-]{1,36}",
            timestamp in 1i64..4_102_444_800,
            target in "/[a-z/]{0,40}",
            payload in proptest::collection::vec(any::<u8>(), 0..256),
            separator in "[|:;,]{0,2}",
        ) {
            let ctx = SigningContext::new()
                .with_auth_token(auth)
                .with_request_id(request_id)
                .with_timestamp(timestamp)
                .with_target(target)
                .with_payload(payload)
                .with_separator(separator);

            let formatter = PayloadFormatter::new();
            prop_assert_eq!(formatter.format_bytes(&ctx), formatter.format_bytes(&ctx));
        }

        #[test]
        fn prop_distinct_payloads_distinct_material(
            a in proptest::collection::vec(any::<u8>(), 1..64),
            b in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(a != b);
            // A fixed non-whitespace frame keeps trimming away from the payload.
            let ctx = |payload: Vec<u8>| {
                let mut framed = vec![b'<'];
                framed.extend(payload);
                framed.push(b'>');
                SigningContext::new()
                    .with_auth_token("t")
                    .with_request_id("r")
                    .with_timestamp(1)
                    .with_payload(framed)
            };

            let formatter = PayloadFormatter::new();
            prop_assert_ne!(formatter.format_bytes(&ctx(a)), formatter.format_bytes(&ctx(b)));
        }
    }
}
