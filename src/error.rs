//! Error taxonomy for the validation-then-generation workflow.
//!
//! Everything below the interaction controller reports through this enum so the
//! controller can tell input mistakes (stay idle, fix the field) apart from
//! failures of the external services (abort the cycle).

use thiserror::Error;

/// Boxed cause carried by the wrapping variants.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration value is absent.
    #[error("Missing required configuration value: {0}")]
    ConfigMissing(String),

    /// A configuration value is present but cannot be used.
    #[error("Invalid configuration value for {key}: {value}")]
    ConfigInvalid { key: String, value: String },

    /// The OAuth2 client-credentials exchange failed.
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("The input programming language '{expected}' does not match the detected language '{detected}'.")]
    LanguageMismatch { expected: String, detected: String },

    #[error("Error during language detection: {0}")]
    Detection(#[source] Cause),

    #[error("Error during test case generation: {0}")]
    Generation(#[source] Cause),

    /// A required form field was left empty.
    #[error("{0} cannot be empty.")]
    EmptyField(&'static str),

    #[error("Requested {requested} test cases, but only 1 to {max} can be generated.")]
    CountOutOfRange { requested: usize, max: usize },
}

impl Error {
    /// Input errors keep the controller idle; they never reach the model.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::EmptyField(_) | Error::CountOutOfRange { .. })
    }
}
