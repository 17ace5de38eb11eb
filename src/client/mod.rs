//! Network access to the YouTube Music web API.
//!
//! The parsing core only sees the [`Transport`] trait. [`SyncClient`] is the
//! real implementation, replaying a browser session captured as a cURL
//! command; [`Retrying`] wraps any transport with fixed-delay retries.

pub mod credentials;
pub mod http;
pub mod retry;

pub use credentials::{Credentials, CredentialsError};
pub use http::SyncClient;
pub use retry::Retrying;

use std::rc::Rc;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while sending a request.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("credentials are not valid, capture a fresh session")]
    Unauthorized,

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("cannot route payload with keys [{0}]")]
    UnknownPayload(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: usize,
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// Whether sending the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ClientError::Unauthorized | ClientError::UnknownPayload(_) | ClientError::InvalidUrl(_)
        )
    }
}

/// The single capability the parsing core needs from its environment.
pub trait Transport {
    /// Sends `payload` as the request body and returns the raw JSON response.
    fn send_request(&self, payload: &Map<String, Value>) -> Result<Value, ClientError>;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn send_request(&self, payload: &Map<String, Value>) -> Result<Value, ClientError> {
        (**self).send_request(payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_request(&self, payload: &Map<String, Value>) -> Result<Value, ClientError> {
        (**self).send_request(payload)
    }
}
