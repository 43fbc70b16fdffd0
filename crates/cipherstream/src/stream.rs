//! Streaming AES-256-CBC transform over `Read`/`Write` pairs.
//!
//! Both directions follow the same producer → transform → consumer loop:
//! read a bounded chunk, run the blocks through the cipher context, write the
//! result, repeat until end-of-input. Backpressure is whatever the output's
//! `write_all` provides. Nothing is ever buffered beyond one chunk, so input
//! size is unbounded.
//!
//! CBC chaining mandates strictly in-order block processing within one
//! operation; there is no ordering relationship between concurrent operations,
//! each of which owns an independent cipher context, key, and IV.

use std::io::{ErrorKind, Read, Write};

use aes::Aes256;
use cipher::{
    block_padding::{Padding, Pkcs7},
    generic_array::GenericArray,
    BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use rand::{rngs::OsRng, RngCore};

use crate::error::CipherStreamError;
use crate::key::{derive_key, DerivedKey};

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

/// Byte length of the random IV prefixed to every container.
pub const IV_LEN: usize = 16;

/// Bounded read size per loop iteration. Must be a multiple of [`BLOCK_LEN`].
const CHUNK_LEN: usize = 64 * 1024;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Block = cipher::Block<Aes256>;

/// Encrypt `input` under a key derived from `passphrase`, writing the
/// IV-prefixed container to `output`.
///
/// A fresh 16-byte IV is drawn from the OS CSPRNG per call and written as the
/// first 16 bytes of the output, followed by the PKCS#7-padded AES-256-CBC
/// ciphertext. The container length is always
/// `16 + (plaintext_len / 16 + 1) * 16`: even a zero-length input produces a
/// full padding block.
///
/// The input is consumed to end-of-stream; open/close of both streams is the
/// caller's responsibility, as is discarding partial output on error.
///
/// Returns the total number of container bytes written (IV included).
///
/// # Errors
///
/// - [`CipherStreamError::InvalidPassphrase`] if `passphrase` is empty. The
///   input stream is not read in that case.
/// - [`CipherStreamError::StreamIo`] on any read or write failure.
pub fn encrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    passphrase: &[u8],
) -> Result<u64, CipherStreamError> {
    let key = derive_key(passphrase)?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    output.write_all(&iv)?;

    let body = encrypt_body(&mut input, &mut output, &key, &iv)?;
    output.flush()?;
    Ok(IV_LEN as u64 + body)
}

/// Decrypt an IV-prefixed container from `input`, writing recovered plaintext
/// to `output`.
///
/// Returns the number of plaintext bytes written.
///
/// # Errors
///
/// - [`CipherStreamError::InvalidPassphrase`] if `passphrase` is empty. The
///   input stream is not read in that case.
/// - [`CipherStreamError::TruncatedContainer`] if fewer than 16 bytes are
///   available for the IV.
/// - [`CipherStreamError::InvalidPadding`] if the ciphertext body is empty,
///   not a multiple of the block size, or its final block's padding is
///   malformed — which is also the only observable signal for a wrong
///   passphrase.
/// - [`CipherStreamError::StreamIo`] on any read or write failure.
pub fn decrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    passphrase: &[u8],
) -> Result<u64, CipherStreamError> {
    let key = derive_key(passphrase)?;

    let mut iv = [0u8; IV_LEN];
    input.read_exact(&mut iv).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            CipherStreamError::TruncatedContainer
        } else {
            CipherStreamError::StreamIo(e)
        }
    })?;

    let body = decrypt_body(&mut input, &mut output, &key, &iv)?;
    output.flush()?;
    Ok(body)
}

/// CBC-encrypt everything readable from `input` with the given key and IV,
/// padding the final block. Returns ciphertext bytes written (IV excluded).
fn encrypt_body<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
) -> Result<u64, CipherStreamError> {
    let mut enc = Aes256CbcEnc::new(key.as_bytes().into(), iv.into());
    let mut buf = vec![0u8; CHUNK_LEN];
    let mut filled = 0;
    let mut written = 0u64;

    loop {
        let n = input.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;

        let full = filled - filled % BLOCK_LEN;
        if full == 0 {
            continue;
        }
        for block in buf[..full].chunks_exact_mut(BLOCK_LEN) {
            enc.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        output.write_all(&buf[..full])?;
        written += full as u64;

        // Carry the partial tail block to the front for the next read.
        buf.copy_within(full..filled, 0);
        filled -= full;
    }

    // Final block: 0..=15 leftover bytes plus PKCS#7 padding. A plaintext
    // that is an exact block multiple still gains one full padding block.
    let mut last = Block::default();
    last[..filled].copy_from_slice(&buf[..filled]);
    Pkcs7::pad(&mut last, filled);
    enc.encrypt_block_mut(&mut last);
    output.write_all(&last)?;
    written += BLOCK_LEN as u64;

    Ok(written)
}

/// CBC-decrypt everything readable from `input` with the given key and IV,
/// stripping the final block's padding. Returns plaintext bytes written.
fn decrypt_body<R: Read, W: Write>(
    input: &mut R,
    output: &mut W,
    key: &DerivedKey,
    iv: &[u8; IV_LEN],
) -> Result<u64, CipherStreamError> {
    let mut dec = Aes256CbcDec::new(key.as_bytes().into(), iv.into());
    let mut buf = vec![0u8; CHUNK_LEN];
    let mut filled = 0;
    let mut written = 0u64;

    // The most recently decrypted block is held back until the next read
    // proves it is not the last one, because only the last block carries
    // padding that must be stripped instead of written.
    let mut held: Option<Block> = None;

    loop {
        let n = input.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;

        let full = filled - filled % BLOCK_LEN;
        if full == 0 {
            continue;
        }
        if let Some(prev) = held.take() {
            output.write_all(&prev)?;
            written += BLOCK_LEN as u64;
        }
        for block in buf[..full].chunks_exact_mut(BLOCK_LEN) {
            dec.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        output.write_all(&buf[..full - BLOCK_LEN])?;
        written += (full - BLOCK_LEN) as u64;

        held = Some(Block::clone_from_slice(&buf[full - BLOCK_LEN..full]));

        buf.copy_within(full..filled, 0);
        filled -= full;
    }

    // A trailing partial block, or no ciphertext at all, cannot carry valid
    // padding.
    if filled != 0 {
        return Err(CipherStreamError::InvalidPadding);
    }
    let last = held.ok_or(CipherStreamError::InvalidPadding)?;
    let plain = Pkcs7::unpad(&last).map_err(|_| CipherStreamError::InvalidPadding)?;
    output.write_all(plain)?;
    written += plain.len() as u64;

    Ok(written)
}
