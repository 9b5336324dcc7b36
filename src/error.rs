//! Error types and result aliases for the art connoisseur pipeline.
//!
//! [`ConnoisseurError`] covers everything that can go wrong once a submission has been
//! accepted: gateway failures, search failures, serialization and IO. Problems with the
//! user's own input are modelled separately by [`InputError`], because they are shown
//! back on the form instead of aborting the request.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnoisseurError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConnoisseurError>;

/// A submission that must not reach the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please provide your OpenAI API key in the sidebar.")]
    MissingModelKey,

    #[error("Please provide your SerpAPI key in the sidebar.")]
    MissingSearchKey,

    #[error("Please upload an artwork image before generating the report.")]
    MissingImage,

    #[error("Unsupported image type for '{0}'. Please upload a JPG, JPEG or PNG file.")]
    UnsupportedImage(String),
}
