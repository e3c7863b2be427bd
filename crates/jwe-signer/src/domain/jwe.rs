//! # Confidentiality Envelope (JWE)
//!
//! RSA-OAEP-256 wraps a fresh 256-bit content key; A256GCM encrypts the
//! payload with the base64url protected header as additional data.
//!
//! ```text
//! BASE64URL(header) . BASE64URL(wrapped CEK) . BASE64URL(IV) . BASE64URL(ciphertext) . BASE64URL(tag)
//! ```
//!
//! Both the compact form and the flattened JSON form are accepted on input.

use crate::domain::b64;
use crate::domain::errors::EnvelopeError;
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Key management algorithm identifier.
pub const ALG_RSA_OAEP_256: &str = "RSA-OAEP-256";

/// Content encryption algorithm identifier.
pub const ENC_A256GCM: &str = "A256GCM";

const CEK_LEN: usize = 32;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;
const SEGMENTS: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    enc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Flattened {
    protected: String,
    encrypted_key: String,
    iv: String,
    ciphertext: String,
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aad: Option<String>,
}

/// Decoded JWE segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    protected: String,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
    aad: Option<String>,
}

impl EncryptedEnvelope {
    /// Parse compact or flattened JSON text.
    ///
    /// # Errors
    ///
    /// `EnvelopeError::Decrypt` if the text has the wrong shape or a segment
    /// is not base64url.
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let text = text.trim();
        if text.starts_with('{') {
            let json: Flattened = serde_json::from_str(text).map_err(malformed)?;
            return Ok(Self {
                encrypted_key: b64::decode(&json.encrypted_key).map_err(malformed)?,
                iv: b64::decode(&json.iv).map_err(malformed)?,
                ciphertext: b64::decode(&json.ciphertext).map_err(malformed)?,
                tag: b64::decode(&json.tag).map_err(malformed)?,
                protected: json.protected,
                aad: json.aad,
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
            encrypted_key: b64::decode(segments[1]).map_err(malformed)?,
            iv: b64::decode(segments[2]).map_err(malformed)?,
            ciphertext: b64::decode(segments[3]).map_err(malformed)?,
            tag: b64::decode(segments[4]).map_err(malformed)?,
            aad: None,
        })
    }

    /// Compact serialization.
    ///
    /// The compact form has no slot for external AAD; an envelope parsed
    /// from JSON with an `aad` member cannot be re-serialized this way.
    pub fn to_compact(&self) -> Result<String, EnvelopeError> {
        if self.aad.is_some() {
            return Err(EnvelopeError::Encrypt(
                "envelope with external aad has no compact form".into(),
            ));
        }
        Ok([
            self.protected.clone(),
            b64::encode(&self.encrypted_key),
            b64::encode(&self.iv),
            b64::encode(&self.ciphertext),
            b64::encode(&self.tag),
        ]
        .join("."))
    }

    /// Flattened JSON serialization.
    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        let json = Flattened {
            protected: self.protected.clone(),
            encrypted_key: b64::encode(&self.encrypted_key),
            iv: b64::encode(&self.iv),
            ciphertext: b64::encode(&self.ciphertext),
            tag: b64::encode(&self.tag),
            aad: self.aad.clone(),
        };
        serde_json::to_string(&json).map_err(|e| EnvelopeError::Encrypt(e.to_string()))
    }

    fn additional_data(&self) -> String {
        match &self.aad {
            Some(aad) => format!("{}.{}", self.protected, aad),
            None => self.protected.clone(),
        }
    }
}

/// Encrypt `plaintext` for the holder of `public_key`.
///
/// # Errors
///
/// `EnvelopeError::Encrypt` if the key wrap or the cipher rejects its input.
pub fn seal(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<EncryptedEnvelope, EnvelopeError> {
    let header = Header {
        alg: ALG_RSA_OAEP_256.to_string(),
        enc: ENC_A256GCM.to_string(),
        zip: None,
        crit: None,
    };
    let header_json = serde_json::to_vec(&header).map_err(|e| EnvelopeError::Encrypt(e.to_string()))?;
    let protected = b64::encode(header_json);

    let mut rng = rand::thread_rng();
    let mut cek = Zeroizing::new([0u8; CEK_LEN]);
    rng.fill_bytes(&mut cek[..]);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let encrypted_key = public_key
        .encrypt(&mut rng, Oaep::new::<Sha256>(), &cek[..])
        .map_err(|e| EnvelopeError::Encrypt(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(&cek[..])
        .map_err(|e| EnvelopeError::Encrypt(e.to_string()))?;
    let mut ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&iv),
            Payload {
                msg: plaintext,
                aad: protected.as_bytes(),
            },
        )
        .map_err(|e| EnvelopeError::Encrypt(e.to_string()))?;

    // aes-gcm appends the tag to the ciphertext.
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    Ok(EncryptedEnvelope {
        protected,
        encrypted_key,
        iv: iv.to_vec(),
        ciphertext,
        tag,
        aad: None,
    })
}

/// Decrypt and authenticate `envelope` with `private_key`.
///
/// # Errors
///
/// `EnvelopeError::Decrypt` for an unsupported header, a key that does not
/// match, or a failed tag check. The last two share one message.
pub fn open(private_key: &RsaPrivateKey, envelope: &EncryptedEnvelope) -> Result<Vec<u8>, EnvelopeError> {
    let header_json = b64::decode(&envelope.protected).map_err(malformed)?;
    let header: Header = serde_json::from_slice(&header_json).map_err(malformed)?;

    if header.alg != ALG_RSA_OAEP_256 {
        return Err(malformed(format!("unsupported alg {:?}", header.alg)));
    }
    if header.enc != ENC_A256GCM {
        return Err(malformed(format!("unsupported enc {:?}", header.enc)));
    }
    if header.zip.is_some() {
        return Err(malformed("compressed payloads are not supported"));
    }
    if let Some(crit) = header.crit {
        return Err(malformed(format!("unsupported critical headers {crit:?}")));
    }
    if envelope.iv.len() != IV_LEN {
        return Err(malformed(format!("iv must be {IV_LEN} bytes")));
    }
    if envelope.tag.len() != TAG_LEN {
        return Err(malformed(format!("tag must be {TAG_LEN} bytes")));
    }

    // RFC 7516 §11.5: a failed unwrap continues with a random CEK so that
    // key mismatch and tag failure are indistinguishable.
    // The unwrap runs blinded since `encrypted_key` is attacker-controlled.
    let mut rng = rand::thread_rng();
    let unwrapped = private_key
        .decrypt_blinded(&mut rng, Oaep::new::<Sha256>(), &envelope.encrypted_key)
        .map(Zeroizing::new);
    let cek = match unwrapped {
        Ok(cek) if cek.len() == CEK_LEN => cek,
        _ => {
            let mut random = Zeroizing::new(vec![0u8; CEK_LEN]);
            rng.fill_bytes(random.as_mut_slice());
            random
        }
    };

    let cipher = Aes256Gcm::new_from_slice(cek.as_slice()).map_err(|_| unable_to_decrypt())?;

    let mut sealed = Vec::with_capacity(envelope.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&envelope.ciphertext);
    sealed.extend_from_slice(&envelope.tag);
    let aad = envelope.additional_data();

    cipher
        .decrypt(
            Nonce::from_slice(&envelope.iv),
            Payload {
                msg: &sealed,
                aad: aad.as_bytes(),
            },
        )
        .map_err(|_| unable_to_decrypt())
}

fn malformed(reason: impl ToString) -> EnvelopeError {
    EnvelopeError::Decrypt(format!("unable to parse message: {}", reason.to_string()))
}

fn unable_to_decrypt() -> EnvelopeError {
    EnvelopeError::Decrypt("unable to decrypt message".into())
}
