//! Inline file attachments.
//!
//! Files are embedded directly in complaint records and chat messages as
//! `data:` URIs, with no external blob storage. Record size is bounded by
//! the store, so every attachment is checked against a caller-supplied
//! ceiling before any encoding work happens.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file as handed over by the UI layer: raw bytes plus declared metadata.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Self-contained encoded attachment, embedded in a record or message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Original filename.
    pub name: String,
    /// `data:<mime>;base64,<payload>` URI carrying the whole file.
    pub data: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("Attachment too large: {size} bytes (max {limit})")]
    TooLarge { size: usize, limit: usize },
}

impl Attachment {
    /// Encode a file into an inline attachment, enforcing `limit` on the
    /// raw byte length. Oversized input is rejected before any encoding.
    pub fn encode(upload: &FileUpload, limit: usize) -> Result<Self, AttachmentError> {
        let size = upload.bytes.len();
        if size > limit {
            return Err(AttachmentError::TooLarge { size, limit });
        }

        let payload = STANDARD.encode(&upload.bytes);
        Ok(Self {
            content_type: upload.content_type.clone(),
            name: upload.name.clone(),
            data: format!("data:{};base64,{}", upload.content_type, payload),
        })
    }

    /// Whether the attachment renders inline as an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
