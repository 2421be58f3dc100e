//! Shared HTTP response envelopes.
//!
//! Every successful response is `{ data, message }`; failures and the delete
//! acknowledgement are message-only `{ message }`.

use serde::{Deserialize, Serialize};

/// Success envelope carrying the payload and a human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
        }
    }
}

/// Message-only envelope used for error responses and delete acknowledgements.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The generic 500 body. No detail leaks to the client.
    pub fn internal_server_error() -> Self {
        Self::new("Internal Server Error")
    }
}
