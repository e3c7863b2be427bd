//! Envelope configuration from environment variables.

use crate::adapters::environment::ProcessEnvironment;
use crate::domain::entities::KeyConfiguration;
use crate::domain::payload::PayloadFormatter;
use crate::ports::outbound::EnvironmentSource;
use crate::service::EnvelopeService;

/// Own private key PEM (or a `${VAR}` reference to one).
pub const ENV_PRIVATE_KEY: &str = "ENVELOPE_PRIVATE_KEY";
/// Counterpart public key PEM (or a `${VAR}` reference to one).
pub const ENV_PUBLIC_KEY: &str = "ENVELOPE_PUBLIC_KEY";
/// Separator for canonical signing strings.
pub const ENV_PAYLOAD_SEPARATOR: &str = "ENVELOPE_PAYLOAD_SEPARATOR";

/// Key material plus canonical-string settings for one party.
#[derive(Clone, Debug, Default)]
pub struct EnvelopeConfig {
    /// Own private key and counterpart public key
    pub keys: KeyConfiguration,

    /// Default separator for `PayloadFormatter`
    pub payload_separator: String,
}

impl EnvelopeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ENVELOPE_PRIVATE_KEY`: own private key PEM (default: empty)
    /// - `ENVELOPE_PUBLIC_KEY`: counterpart public key PEM (default: empty)
    /// - `ENVELOPE_PAYLOAD_SEPARATOR`: canonical string separator (default: empty)
    ///
    /// Missing keys are not an error here. They surface as
    /// `KeyParseError::MissingKeyMaterial` on first use.
    pub fn from_env() -> Self {
        Self::from_source(&ProcessEnvironment)
    }

    /// Same as `from_env`, reading from `env`.
    pub fn from_source<E: EnvironmentSource + ?Sized>(env: &E) -> Self {
        Self {
            keys: KeyConfiguration::new(
                env.var(ENV_PRIVATE_KEY).unwrap_or_default(),
                env.var(ENV_PUBLIC_KEY).unwrap_or_default(),
            ),
            payload_separator: env.var(ENV_PAYLOAD_SEPARATOR).unwrap_or_default(),
        }
    }

    /// Formatter using the configured separator.
    pub fn formatter(&self) -> PayloadFormatter {
        PayloadFormatter::with_separator(self.payload_separator.clone())
    }

    /// Service resolving placeholders from the process environment.
    pub fn into_service(self) -> EnvelopeService {
        EnvelopeService::new(self.keys)
    }
}
