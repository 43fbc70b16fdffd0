//! Multipart upload spooling.
//!
//! Every uploaded part is streamed into an anonymous temp file
//! ([`tempfile::tempfile`]), never buffered whole in memory. Anonymous files
//! have no directory entry, so cleanup is unconditional on every exit path —
//! success, handler error, or mid-request abort — once the handles drop.

use std::io::{Seek, SeekFrom};

use axum::extract::multipart::{Field, Multipart};
use common::ServiceError;
use tokio::io::AsyncWriteExt;

/// A spooled `file` part plus the passphrase for a cipher operation.
pub struct CipherUpload {
    /// Uploaded bytes, rewound to the start.
    pub file: std::fs::File,
    /// Client-supplied file name, if the part carried one.
    pub file_name: Option<String>,
    /// Passphrase bytes from the `key` (or legacy `password`) text field.
    /// May be empty; the cipher engine is the authority that rejects that.
    pub passphrase: Vec<u8>,
}

/// Read the multipart form of `POST /api/encrypt` / `POST /api/decrypt`:
/// a `file` part and a `key` (alias `password`) text field.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] if the form is malformed or the
/// `file` part is missing.
pub async fn read_cipher_upload(mut multipart: Multipart) -> Result<CipherUpload, ServiceError> {
    let mut file: Option<(std::fs::File, Option<String>)> = None;
    let mut passphrase = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or("").to_owned().as_str() {
            "file" => {
                let name = field.file_name().map(str::to_owned);
                let spooled = spool_field(&mut field).await?;
                file = Some((spooled, name));
            }
            "key" | "password" => {
                passphrase = field.bytes().await.map_err(bad_multipart)?.to_vec();
            }
            _ => {}
        }
    }

    let (file, file_name) =
        file.ok_or_else(|| ServiceError::BadRequest("missing file part".into()))?;
    Ok(CipherUpload {
        file,
        file_name,
        passphrase,
    })
}

/// A spooled image upload plus the requested target format.
pub struct ImageUpload {
    /// Uploaded bytes, rewound to the start.
    pub file: std::fs::File,
    /// Requested output format from the `target` text field (default `jpeg`).
    pub target: String,
}

/// Read the multipart form of `POST /api/image/convert`: a `file` part and an
/// optional `target` text field.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] if the form is malformed or the
/// `file` part is missing.
pub async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, ServiceError> {
    let mut file = None;
    let mut target = String::from("jpeg");

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or("").to_owned().as_str() {
            "file" => file = Some(spool_field(&mut field).await?),
            "target" => target = field.text().await.map_err(bad_multipart)?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ServiceError::BadRequest("missing file part".into()))?;
    Ok(ImageUpload { file, target })
}

/// Read the multipart form of `POST /api/pdf/merge`: repeated `pdfs` parts,
/// merged later in field order.
///
/// # Errors
///
/// Returns [`ServiceError::BadRequest`] if the form is malformed or no `pdfs`
/// part is present.
pub async fn read_pdf_uploads(mut multipart: Multipart) -> Result<Vec<std::fs::File>, ServiceError> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("pdfs") {
            files.push(spool_field(&mut field).await?);
        }
    }

    if files.is_empty() {
        return Err(ServiceError::BadRequest("no pdfs parts uploaded".into()));
    }
    Ok(files)
}

/// Stream one multipart field into an anonymous temp file and rewind it.
async fn spool_field(field: &mut Field<'_>) -> Result<std::fs::File, ServiceError> {
    let std_file = tempfile::tempfile()
        .map_err(|e| ServiceError::Internal(format!("failed to create temp file: {e}")))?;
    let mut file = tokio::fs::File::from_std(std_file);

    while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
        file.write_all(&chunk)
            .await
            .map_err(|e| ServiceError::Internal(format!("failed to spool upload: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| ServiceError::Internal(format!("failed to spool upload: {e}")))?;

    let mut std_file = file.into_std().await;
    std_file
        .seek(SeekFrom::Start(0))
        .map_err(|e| ServiceError::Internal(format!("failed to rewind temp file: {e}")))?;
    Ok(std_file)
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ServiceError {
    ServiceError::BadRequest(format!("malformed multipart request: {e}"))
}
