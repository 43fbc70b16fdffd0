//! Axum HTTP server, routing, and request handling.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Spool multipart uploads to anonymous temp files and stream results back.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod router;
pub mod state;
pub mod upload;
