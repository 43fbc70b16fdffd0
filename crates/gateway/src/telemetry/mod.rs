//! Structured logging setup for the gateway.
//!
//! # Telemetry invariants
//!
//! - **No passphrase or key material** must appear in any span attribute or
//!   log field. Uploaded file contents are never logged either.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
