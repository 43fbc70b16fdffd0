//! Errors produced by the cipher stream engine.

use thiserror::Error;

use crate::stream::IV_LEN;

/// Errors produced by [`encrypt_stream`](crate::encrypt_stream) and
/// [`decrypt_stream`](crate::decrypt_stream).
///
/// Every variant is terminal for the current operation: the engine never
/// retries, and any partially written output is the caller's responsibility
/// to discard.
#[derive(Debug, Error)]
pub enum CipherStreamError {
    /// The passphrase is absent or empty. There is no fallback passphrase;
    /// encrypting under a silent default is a security anti-pattern.
    #[error("passphrase must not be empty")]
    InvalidPassphrase,

    /// The ciphertext container is shorter than the 16-byte IV prefix.
    #[error("ciphertext container shorter than the {IV_LEN}-byte IV prefix")]
    TruncatedContainer,

    /// The final block's PKCS#7 padding is malformed. This conflates "wrong
    /// passphrase" and "corrupted or foreign container" — CBC without a MAC
    /// cannot tell them apart.
    #[error("invalid padding: wrong passphrase or corrupted container")]
    InvalidPadding,

    /// An underlying read or write on the input or output stream failed.
    #[error("stream I/O failure")]
    StreamIo(#[from] std::io::Error),
}
