use thiserror::Error;

use crate::core::errors::ApiError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] ApiError),

    #[error("Environment variable {0} is not set; the model server credential is required")]
    MissingCredential(String),

    #[error("Failed to build the retrieval chain: {0}")]
    Chain(#[source] ApiError),
}
