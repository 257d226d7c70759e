use thiserror::Error;

/// Failures raised while talking to the token exchange service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenExchangeError {
    #[error("Unsupported STS API version '{0}'")]
    UnsupportedVersion(String),

    #[error("AWS STS returned no credentials")]
    MissingCredentials,

    #[error("Failed to assume role: {0}")]
    Request(String),
}

/// Failures that abort command initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// A required option was missing or empty.
    #[error("Option --{option} empty")]
    Validation { option: &'static str },

    #[error(transparent)]
    TokenExchange(#[from] TokenExchangeError),
}
