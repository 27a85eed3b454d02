//! Controller error types.

use thiserror::Error;
use turbo_data::FetchError;
use turbo_dom::SelectorError;

/// Errors from the storefront remote endpoints.
///
/// The `Display` text is what shoppers see when a cart add fails.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never completed.
    #[error("{0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Request failed with status {status}")]
    Http { status: u16, message: String },

    /// The body was not the expected `{ "data": ... }` document.
    #[error("Unexpected response from the store: {0}")]
    Decode(String),
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Transport(msg) | FetchError::InvalidUrl(msg) => ApiError::Transport(msg),
            FetchError::Http { status, message } => ApiError::Http { status, message },
            FetchError::Parse(msg) | FetchError::Json(msg) => ApiError::Decode(msg),
        }
    }
}

/// Errors raised while binding a controller or loading its configuration.
#[derive(Error, Debug)]
pub enum PdpError {
    /// A required element is not in the document.
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// A built-in selector failed to parse.
    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The page context could not be decoded.
    #[error("Invalid page context: {0}")]
    Context(#[from] serde_json::Error),

    /// A TOML configuration document could not be decoded.
    #[error("Invalid configuration file: {0}")]
    ConfigFormat(#[from] toml::de::Error),
}
