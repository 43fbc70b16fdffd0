//! Common types, protocol definitions, and errors shared across file-tools crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
