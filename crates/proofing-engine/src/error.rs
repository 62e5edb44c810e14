use thiserror::Error;

/// Failures reported by analysis providers.
///
/// Callers recover from all of these by falling back to the local engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider timed out after {0}ms")]
    Timeout(u64),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}
