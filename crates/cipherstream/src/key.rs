//! Passphrase → AES-256 key derivation.

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::error::CipherStreamError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// A 256-bit key derived from a passphrase.
///
/// Computed fresh per operation and held only for the duration of the cipher
/// transformation. Zeroized on drop so plaintext key material does not linger
/// in freed memory.
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 32-byte AES key as `SHA-256(passphrase)`.
///
/// Deterministic: the same passphrase always yields the same key. There is
/// deliberately no salt and no iteration count — this is a fast, low-cost
/// derivation whose brute-force exposure the caller accepts (see the crate
/// docs). What is *not* accepted is a default: an empty passphrase is
/// rejected rather than silently replaced by a hard-coded constant.
///
/// # Errors
///
/// Returns [`CipherStreamError::InvalidPassphrase`] if `passphrase` is empty.
pub fn derive_key(passphrase: &[u8]) -> Result<DerivedKey, CipherStreamError> {
    if passphrase.is_empty() {
        return Err(CipherStreamError::InvalidPassphrase);
    }
    let digest = Sha256::digest(passphrase);
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&digest);
    Ok(DerivedKey { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_passphrase_same_key() {
        let a = derive_key(b"correct horse battery staple").unwrap();
        let b = derive_key(b"correct horse battery staple").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_passphrases_differ() {
        let a = derive_key(b"alpha").unwrap();
        let b = derive_key(b"bravo").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn empty_passphrase_rejected() {
        assert!(matches!(
            derive_key(b""),
            Err(CipherStreamError::InvalidPassphrase)
        ));
    }

    #[test]
    fn key_is_sha256_of_passphrase() {
        // SHA-256("abc") is a published test vector.
        let key = derive_key(b"abc").unwrap();
        let expected: [u8; 32] = [
            0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
            0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
            0xf2, 0x00, 0x15, 0xad,
        ];
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn debug_is_redacted() {
        let key = derive_key(b"secret").unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
