//! # Domain Layer
//!
//! Key resolution, JOSE envelope codecs and the canonical signing string.
//! Nothing here holds state; the service layer owns the key configuration.

pub mod entities;
pub mod errors;
pub mod jwe;
pub mod jws;
pub mod keys;
pub mod payload;

pub(crate) mod b64 {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
        URL_SAFE_NO_PAD.decode(segment)
    }
}
