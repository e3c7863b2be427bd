//! # Outbound Ports (Driven Ports / SPI)
//!
//! Key strings may reference environment variables. The resolver reads them
//! through this port so tests can supply a fixed environment.

/// Source of environment variable values.
pub trait EnvironmentSource: Send + Sync {
    /// Value of `name`, or `None` if it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

impl<T: EnvironmentSource + ?Sized> EnvironmentSource for std::sync::Arc<T> {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}
