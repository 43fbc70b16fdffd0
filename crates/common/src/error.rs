//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::UnprocessableInput`] → 422
/// - [`ServiceError::UpstreamUnavailable`] → 502
/// - [`ServiceError::Unavailable`] → 503
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed — missing file part, missing or empty
    /// passphrase, or an unsupported conversion target.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The uploaded bytes could not be processed — a container that fails
    /// padding validation, an undecodable image, or an unparseable PDF.
    #[error("unprocessable input: {0}")]
    UnprocessableInput(String),

    /// The external chat completion API could not be reached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A required resource is not configured or temporarily unavailable.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::UnprocessableInput(_) => 422,
            ServiceError::UpstreamUnavailable(_) => 502,
            ServiceError::Unavailable(_) => 503,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable error code used in the JSON error body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::UnprocessableInput(_) => "unprocessable_input",
            ServiceError::UpstreamUnavailable(_) => "upstream_unavailable",
            ServiceError::Unavailable(_) => "service_unavailable",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(
            ServiceError::UnprocessableInput("x".into()).http_status(),
            422
        );
        assert_eq!(
            ServiceError::UpstreamUnavailable("x".into()).http_status(),
            502
        );
        assert_eq!(ServiceError::Unavailable("x".into()).http_status(), 503);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("missing file part".into());
        assert!(e.to_string().contains("missing file part"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ServiceError::BadRequest("x".into()).code(), "bad_request");
        assert_eq!(
            ServiceError::UnprocessableInput("x".into()).code(),
            "unprocessable_input"
        );
    }
}
