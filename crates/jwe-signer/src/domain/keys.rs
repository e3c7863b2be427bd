//! # Key Resolution
//!
//! Turns configured key strings into RSA keys in two steps:
//!
//! 1. Substitute `${NAME}` / `$NAME` references from the environment.
//!    Unknown names stay in the text as written.
//! 2. Parse the PEM block.
//!
//! | Role | Accepted PEM labels |
//! |------|---------------------|
//! | Own private key | `RSA PRIVATE KEY` (PKCS#1), `PRIVATE KEY` (PKCS#8) |
//! | Counterpart public key | `PUBLIC KEY` (SPKI), `RSA PUBLIC KEY` (PKCS#1) |
//!
//! Nothing is cached. Every call re-reads the environment and re-parses.

use crate::adapters::environment::ProcessEnvironment;
use crate::domain::entities::{KeyConfiguration, KeyRole};
use crate::domain::errors::KeyParseError;
use crate::ports::outbound::EnvironmentSource;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

const PEM_BEGIN: &str = "-----BEGIN ";

/// Resolves configured key strings into parsed RSA keys.
#[derive(Clone, Debug, Default)]
pub struct KeyResolver<E = ProcessEnvironment> {
    env: E,
}

impl KeyResolver<ProcessEnvironment> {
    /// Resolver backed by the process environment.
    pub fn from_process_env() -> Self {
        Self::default()
    }
}

impl<E: EnvironmentSource> KeyResolver<E> {
    /// Resolver backed by `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// Replace environment references in `text`.
    ///
    /// A single pass: substituted values are not expanded again.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            let (name, consumed) = match after.strip_prefix('{') {
                Some(inner) => match inner.find('}') {
                    Some(end) if var_name_len(&inner[..end]) == end && end > 0 => {
                        (&inner[..end], end + 2)
                    }
                    _ => ("", 0),
                },
                None => {
                    let len = var_name_len(after);
                    (&after[..len], len)
                }
            };

            if name.is_empty() {
                out.push('$');
                rest = after;
                continue;
            }

            let reference = &rest[pos..pos + 1 + consumed];
            match self.env.var(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(reference),
            }
            rest = &after[consumed..];
        }

        out.push_str(rest);
        out
    }

    /// Parse the own private key.
    ///
    /// # Errors
    ///
    /// `KeyParseError::MissingKeyMaterial` for empty text,
    /// `KeyParseError::InvalidPem` for anything that is not an RSA private key.
    pub fn private_key(&self, config: &KeyConfiguration) -> Result<RsaPrivateKey, KeyParseError> {
        let role = KeyRole::OwnPrivate;
        let pem = self.resolved(config, role)?;

        match pem_label(&pem) {
            Some("RSA PRIVATE KEY") => {
                RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|e| invalid(role, e))
            }
            Some("PRIVATE KEY") => RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|e| invalid(role, e)),
            Some(other) => Err(invalid(role, format!("unsupported PEM label {other:?}"))),
            None => Err(invalid(role, "no PEM block found")),
        }
    }

    /// Parse the counterpart public key.
    ///
    /// # Errors
    ///
    /// `KeyParseError::MissingKeyMaterial` for empty text,
    /// `KeyParseError::InvalidPem` for anything that is not an RSA public key.
    pub fn public_key(&self, config: &KeyConfiguration) -> Result<RsaPublicKey, KeyParseError> {
        let role = KeyRole::CounterpartPublic;
        let pem = self.resolved(config, role)?;

        match pem_label(&pem) {
            Some("PUBLIC KEY") => {
                RsaPublicKey::from_public_key_pem(&pem).map_err(|e| invalid(role, e))
            }
            Some("RSA PUBLIC KEY") => RsaPublicKey::from_pkcs1_pem(&pem).map_err(|e| invalid(role, e)),
            Some(other) => Err(invalid(role, format!("unsupported PEM label {other:?}"))),
            None => Err(invalid(role, "no PEM block found")),
        }
    }

    /// Parse the counterpart public key, accepting only a PKCS#1
    /// `RSA PUBLIC KEY` block.
    pub fn public_key_pkcs1(&self, config: &KeyConfiguration) -> Result<RsaPublicKey, KeyParseError> {
        let role = KeyRole::CounterpartPublic;
        let pem = self.resolved(config, role)?;

        match pem_label(&pem) {
            Some("RSA PUBLIC KEY") => RsaPublicKey::from_pkcs1_pem(&pem).map_err(|e| invalid(role, e)),
            Some(other) => Err(invalid(role, format!("expected RSA PUBLIC KEY, found {other:?}"))),
            None => Err(invalid(role, "failed to parse PEM block containing the public key")),
        }
    }

    fn resolved(
        &self,
        config: &KeyConfiguration,
        role: KeyRole,
    ) -> Result<Zeroizing<String>, KeyParseError> {
        let text = Zeroizing::new(self.substitute(config.material(role)));
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(KeyParseError::MissingKeyMaterial { role });
        }
        Ok(Zeroizing::new(trimmed.to_string()))
    }
}

fn invalid(role: KeyRole, reason: impl ToString) -> KeyParseError {
    KeyParseError::InvalidPem {
        role,
        reason: reason.to_string(),
    }
}

/// Label of the first PEM block, e.g. `PUBLIC KEY`.
fn pem_label(text: &str) -> Option<&str> {
    let start = text.find(PEM_BEGIN)? + PEM_BEGIN.len();
    let len = text[start..].find("-----")?;
    Some(&text[start..start + len])
}

/// Length of the identifier at the start of `s` (`[A-Za-z_][A-Za-z0-9_]*`).
fn var_name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}
