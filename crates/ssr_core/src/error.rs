//! Core SSR error types (pure - no I/O variants).

use thiserror::Error;

/// Core SSR errors (pure - no I/O variants).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SsrCoreError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Metadata instance {0} is not registered")]
    StaleInstance(u64),

    #[error("Store name '{0}' is reserved")]
    ReservedStoreName(String),

    #[error("Unknown runtime mode: {0}")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, SsrCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_instance_display() {
        let error = SsrCoreError::StaleInstance(7);
        assert_eq!(error.to_string(), "Metadata instance 7 is not registered");
    }

    #[test]
    fn test_reserved_store_name_display() {
        let error = SsrCoreError::ReservedStoreName("router".to_string());
        assert_eq!(error.to_string(), "Store name 'router' is reserved");
    }
}
