//! Ad-hoc file transformation tools behind the gateway's endpoints.
//!
//! These are thin wrappers over the `image` and `lopdf` crates, synchronous
//! and blocking like the cipher engine; handlers run them via
//! `tokio::task::spawn_blocking`.

pub mod image;
pub mod pdf;
