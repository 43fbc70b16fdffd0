//! Streaming AES-256-CBC encryption and decryption of arbitrary-size byte streams.
//!
//! This crate is intentionally free of HTTP and async dependencies. It provides
//! the low-level encrypt/decrypt operations used by the gateway handlers.
//!
//! # Container format
//!
//! ```text
//! [16 bytes: random IV][N bytes: AES-256-CBC ciphertext, PKCS#7 padded]
//! ```
//!
//! The container carries no version byte, no algorithm identifier, and no
//! integrity tag — the consumer is assumed to know the algorithm out-of-band,
//! and a wrong passphrase is only observable as a padding failure on the final
//! block.
//!
//! # Security properties and limitations
//!
//! - The key is `SHA-256(passphrase)`: deterministic, unsalted, uniterated.
//!   Weak passphrases are brute-forceable; callers accept that trade-off. A
//!   memory-hard KDF would be a drop-in replacement behind [`derive_key`].
//! - CBC without a MAC provides confidentiality only. There is no tamper
//!   detection.
//! - The IV is drawn fresh from the OS CSPRNG for every encryption, so two
//!   encryptions of the same plaintext under the same passphrase never produce
//!   the same container.
//! - Passphrase and key material never appear in logs, errors, or `Debug`
//!   output.

pub mod error;
pub mod key;
pub mod stream;

pub use error::CipherStreamError;
pub use key::{derive_key, DerivedKey, KEY_LEN};
pub use stream::{decrypt_stream, encrypt_stream, BLOCK_LEN, IV_LEN};
