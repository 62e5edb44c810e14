use patch_engine::PatchError;
use proofing_engine::{DictionaryError, ProviderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Issue {0} has no suggestion")]
    NoSuggestion(String),
}
