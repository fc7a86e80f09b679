use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Result, TryOnError};

pub const PNG_MIME: &str = "image/png";
pub const DEFAULT_RESULT_FILENAME: &str = "ai-try-on-result.png";

/// Strips a `data:<mime>;base64,` prefix by splitting on the first comma.
/// Input without a comma comes back untouched. The remainder is not checked
/// for valid base64.
pub fn normalize(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

/// Wraps a bare base64 payload as a PNG data URL.
pub fn png_data_url(payload: &str) -> String {
    format!("data:{};base64,{}", PNG_MIME, payload)
}

/// Decodes a data URL (or bare base64 payload) back into raw bytes, e.g. to
/// save a generated image to disk.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(normalize(url).trim())
        .map_err(|e| TryOnError::Decode(e.to_string()))
}

/// An image as a base64 string, either a full data URL or a bare payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encodes raw bytes as `data:<mime>;base64,<payload>`.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)))
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| TryOnError::Io(format!("{}: {}", path.display(), e)))?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(guess_mime(path), &bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn payload(&self) -> &str {
        normalize(&self.0)
    }

    /// Declared mime type of a data URL; `None` for bare payloads.
    pub fn mime_type(&self) -> Option<&str> {
        let (header, _) = self.0.split_once(',')?;
        let header = header.strip_prefix("data:")?;
        header.split(';').next().filter(|m| !m.is_empty())
    }
}

impl From<String> for EncodedImage {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EncodedImage {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}
