//! Uniform response envelope.
//!
//! Every endpoint wraps its payload in the same envelope so clients
//! can branch on `success` without inspecting status codes first.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps `data` in a success envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            timestamp: Utc::now(),
        }
    }
}
