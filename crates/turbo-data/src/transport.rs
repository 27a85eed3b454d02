//! Pluggable request execution.
//!
//! The client never performs I/O itself. Browser builds hand requests to
//! `fetch`, server builds to their HTTP stack, tests to a canned responder.

use async_trait::async_trait;

use crate::{FetchError, RequestBuilder, Response};

/// Executes finished requests.
///
/// Runs on a single-threaded event loop, so futures are not `Send`.
#[async_trait(?Send)]
pub trait Transport {
    /// Send the request and wait for the full response.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError>;
}

/// A transport that refuses every request.
///
/// Useful as a placeholder before the platform transport is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineTransport;

#[async_trait(?Send)]
impl Transport for OfflineTransport {
    async fn execute(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        Err(FetchError::Transport(format!(
            "offline: {} {}",
            request.method().as_str(),
            request.url()
        )))
    }
}
