//! Registry error types.

/// Errors raised while constructing or configuring a [`crate::ModalRegistry`]
///
/// The modal operations themselves never fail; closing an unknown id is a no-op.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No Tokio runtime available to schedule modal close timers")]
    NoRuntime,
    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),
}
