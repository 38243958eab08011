//! Photo intake for the two upload slots (guest portrait, vehicle plate).
//!
//! Files are accepted on their declared MIME type only; the core never
//! decodes image data. An accepted file is staged twice: once as bare
//! base64 for the submit payload and once as a `data:` URI the shell can
//! render directly.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upload ceiling in megabytes. The comparison is done in floating point
/// (`bytes / 1024 / 1024 < 5`), so a file of exactly 5 MiB is rejected.
/// The backend applies the same boundary; keep them in lockstep.
pub const MAX_UPLOAD_MIB: f64 = 5.0;

/// Photos the backend already holds come back as bare base64 with no type
/// information; they are stored as JPEG.
pub const STORED_PHOTO_MIME: &str = "image/jpeg";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("Please select an image file (e.g., JPEG, PNG, etc.)")]
    UnsupportedType { mime_type: String },
    #[error("Please select an image file less than 5MB")]
    TooLarge { size_bytes: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub mime_type: String,
    pub size_bytes: usize,
    /// Base64 without any data-URI prefix; what the backend receives.
    pub transport_base64: String,
    /// Display-ready `data:` URI for the shell's preview.
    pub preview_data_uri: String,
}

impl Attachment {
    pub fn from_upload(mime_type: &str, data: &[u8]) -> Result<Self, AttachmentError> {
        if !mime_type.starts_with("image/") {
            return Err(AttachmentError::UnsupportedType {
                mime_type: mime_type.to_string(),
            });
        }

        let mib = data.len() as f64 / 1024.0 / 1024.0;
        if mib >= MAX_UPLOAD_MIB {
            return Err(AttachmentError::TooLarge {
                size_bytes: data.len(),
            });
        }

        let transport_base64 = BASE64.encode(data);
        let preview_data_uri = format!("data:{mime_type};base64,{transport_base64}");

        Ok(Self {
            mime_type: mime_type.to_string(),
            size_bytes: data.len(),
            transport_base64,
            preview_data_uri,
        })
    }

    /// A photo the backend already holds: display-only, no raw bytes, and
    /// no size or type gate — it never went through the upload path.
    #[must_use]
    pub fn from_stored(base64: &str) -> Self {
        Self {
            mime_type: STORED_PHOTO_MIME.to_string(),
            size_bytes: 0,
            transport_base64: base64.to_string(),
            preview_data_uri: format!("data:{STORED_PHOTO_MIME};base64,{base64}"),
        }
    }
}
