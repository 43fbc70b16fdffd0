//! Request and response types exchanged over the public HTTP API.
//!
//! File uploads and downloads travel as multipart form data and raw byte
//! streams; only error bodies and the health check are JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers. Never contains
    /// passphrase or key material.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status; always `"ok"` — the gateway has no warm-up
    /// dependencies, every tool operates per-request.
    pub status: String,
    /// Whether an API key for the chat completion upstream is configured.
    /// `POST /api/chat` returns 503 while this is `false`.
    pub chat_upstream_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "missing file part");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("missing file part"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            chat_upstream_configured: true,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert!(decoded.chat_upstream_configured);
        assert_eq!(decoded.status, "ok");
    }
}
