//! # Canonical Signing String
//!
//! ```text
//! auth-token SEP request-id SEP timestamp SEP target SEP payload
//! ```
//!
//! The formatter only builds the string. Whether the caller signs this
//! string or the raw payload is up to the caller.
//!
//! The material is built from raw bytes so distinct payloads never map to
//! the same material. `format` adds a UTF-8 view and rejects payloads that
//! have none.

use crate::domain::entities::SigningContext;
use crate::domain::errors::FormatError;

/// Canonical bytes plus the context they were built from, with any
/// generated request id and timestamp filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalPayload {
    /// The bytes to sign
    pub material: Vec<u8>,
    /// Context after defaults were applied
    pub context: SigningContext,
}

impl CanonicalPayload {
    /// Material as text, if it is UTF-8.
    pub fn material_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.material).ok()
    }
}

/// Builds canonical strings from a `SigningContext`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadFormatter {
    separator: String,
}

impl Default for PayloadFormatter {
    fn default() -> Self {
        Self {
            separator: Self::DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl PayloadFormatter {
    /// Fields are concatenated with nothing between them unless a
    /// separator is configured.
    pub const DEFAULT_SEPARATOR: &'static str = "";

    /// Formatter using `DEFAULT_SEPARATOR`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter with its own default separator. A non-empty separator on
    /// the context still takes precedence.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Separator used when the context does not set one.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Build the canonical string.
    ///
    /// Deterministic only when the context carries both a request id and a
    /// positive timestamp.
    ///
    /// # Errors
    ///
    /// `FormatError::NonUtf8Payload` when the payload is not UTF-8. Use
    /// `format_bytes` for binary payloads.
    pub fn format(&self, context: &SigningContext) -> Result<String, FormatError> {
        String::from_utf8(self.format_bytes(context)).map_err(|e| FormatError::NonUtf8Payload {
            valid_up_to: e.utf8_error().valid_up_to(),
        })
    }

    /// Build the canonical material, byte for byte.
    pub fn format_bytes(&self, context: &SigningContext) -> Vec<u8> {
        self.format_resolved(context.clone()).material
    }

    /// Build the canonical material and return the resolved context, so the
    /// caller can send the generated request id and timestamp alongside.
    pub fn format_resolved(&self, mut context: SigningContext) -> CanonicalPayload {
        if context.request_id.is_empty() {
            context.request_id = uuid::Uuid::new_v4().to_string();
        }
        if context.timestamp <= 0 {
            context.timestamp = chrono::Utc::now().timestamp();
        }

        let sep = if context.separator.is_empty() {
            self.separator.as_bytes()
        } else {
            context.separator.as_bytes()
        };

        let timestamp = context.timestamp.to_string();
        let fields: [&[u8]; 5] = [
            context.auth_token.as_bytes(),
            context.request_id.as_bytes(),
            timestamp.as_bytes(),
            context.target.as_bytes(),
            &context.payload,
        ];
        let material = trim_whitespace(&fields.join(sep)).to_vec();

        tracing::trace!(
            request_id = %context.request_id,
            timestamp = context.timestamp,
            len = material.len(),
            "canonical payload built"
        );

        CanonicalPayload { material, context }
    }
}

/// `str::trim` on the UTF-8 ends of `bytes`. Invalid sequences are kept.
fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let lead = bytes.utf8_chunks().next().map_or(0, |chunk| {
        let valid = chunk.valid();
        valid.len() - valid.trim_start().len()
    });
    let bytes = &bytes[lead..];

    let tail = match bytes.utf8_chunks().last() {
        Some(chunk) if chunk.invalid().is_empty() => {
            let valid = chunk.valid();
            valid.len() - valid.trim_end().len()
        }
        _ => 0,
    };
    &bytes[..bytes.len() - tail]
}
