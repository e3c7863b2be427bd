//! # Authenticity Envelope (JWS)
//!
//! RS256: RSASSA-PKCS1-v1_5 over SHA-256 of `header . payload`.
//!
//! PKCS#1 v1.5 signing is deterministic. The same key and message always
//! produce the same compact string.

use crate::domain::b64;
use crate::domain::errors::{EnvelopeError, VerifyError};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Signature algorithm identifier.
pub const ALG_RS256: &str = "RS256";

const SEGMENTS: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    b64: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,
}

/// Flattened JSON form.
#[derive(Debug, Deserialize)]
struct Flattened {
    payload: String,
    protected: String,
    signature: String,
}

/// JWS segments, kept in their base64url text form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedEnvelope {
    protected: String,
    payload: String,
    signature: String,
}

impl SignedEnvelope {
    /// Parse compact or flattened JSON text.
    ///
    /// # Errors
    ///
    /// `VerifyError::Malformed` if the text has the wrong shape.
    pub fn parse(text: &str) -> Result<Self, VerifyError> {
        let text = text.trim();
        if text.starts_with('{') {
            let json: Flattened = serde_json::from_str(text).map_err(malformed)?;
            return Ok(Self {
                protected: json.protected,
                payload: json.payload,
                signature: json.signature,
            });
        }

        let segments: Vec<&str> = text.split('.').collect();
        if segments.len() != SEGMENTS {
            return Err(malformed(format!(
                "expected {SEGMENTS} segments, found {}",
                segments.len()
            )));
        }

        Ok(Self {
            protected: segments[0].to_string(),
            payload: segments[1].to_string(),
            signature: segments[2].to_string(),
        })
    }

    /// Base64url protected header.
    pub fn protected(&self) -> &str {
        &self.protected
    }

    /// Base64url payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Base64url signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Compact serialization.
    pub fn to_compact(&self) -> String {
        format!("{}.{}.{}", self.protected, self.payload, self.signature)
    }

    /// Flattened JSON serialization.
    pub fn to_json(&self) -> String {
        // Three string fields: serialization cannot fail.
        serde_json::json!({
            "payload": self.payload,
            "protected": self.protected,
            "signature": self.signature,
        })
        .to_string()
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.protected, self.payload)
    }
}

/// Sign `message` with `private_key`.
///
/// # Errors
///
/// `EnvelopeError::Sign` if the key cannot produce an RS256 signature.
pub fn sign(private_key: &RsaPrivateKey, message: &[u8]) -> Result<SignedEnvelope, EnvelopeError> {
    let header = Header {
        alg: ALG_RS256.to_string(),
        b64: None,
        crit: None,
    };
    let header_json = serde_json::to_vec(&header).map_err(|e| EnvelopeError::Sign(e.to_string()))?;

    let mut envelope = SignedEnvelope {
        protected: b64::encode(header_json),
        payload: b64::encode(message),
        signature: String::new(),
    };

    // Blinding randomizes the private-key exponentiation only. PKCS#1 v1.5
    // output stays deterministic.
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign_with_rng(&mut rand::thread_rng(), envelope.signing_input().as_bytes())
        .map_err(|e| EnvelopeError::Sign(e.to_string()))?;
    envelope.signature = b64::encode(signature.to_bytes());

    Ok(envelope)
}

/// Verify `envelope` against `public_key` and return the decoded payload.
///
/// # Errors
///
/// `VerifyError::Malformed` for an unsupported header or undecodable
/// segment, `VerifyError::InvalidSignature` when the signature check fails.
pub fn verify(public_key: &RsaPublicKey, envelope: &SignedEnvelope) -> Result<Vec<u8>, VerifyError> {
    let header_json = b64::decode(&envelope.protected).map_err(malformed)?;
    let header: Header = serde_json::from_slice(&header_json).map_err(malformed)?;

    if header.alg != ALG_RS256 {
        return Err(malformed(format!("unsupported alg {:?}", header.alg)));
    }
    if header.b64 == Some(false) {
        return Err(malformed("unencoded payloads are not supported"));
    }
    if let Some(crit) = header.crit {
        return Err(malformed(format!("unsupported critical headers {crit:?}")));
    }

    let payload = b64::decode(&envelope.payload).map_err(malformed)?;
    let signature_bytes = b64::decode(&envelope.signature).map_err(malformed)?;
    let signature = Signature::try_from(signature_bytes.as_slice()).map_err(malformed)?;

    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(envelope.signing_input().as_bytes(), &signature)
        .map_err(|_| VerifyError::InvalidSignature)?;

    Ok(payload)
}

fn malformed(reason: impl ToString) -> VerifyError {
    VerifyError::Malformed(reason.to_string())
}
