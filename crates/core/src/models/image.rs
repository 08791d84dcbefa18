use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A chart image ready to be sent to a prediction provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    /// Original file name (or a label for pasted images)
    pub name: String,

    /// Image bytes, standard base64 without a data-URL prefix
    pub data: String,

    /// Detected MIME type, always `image/*`
    pub mime_type: String,
}

impl EncodedImage {
    /// Encode raw bytes from a file picker, drop or clipboard paste.
    /// The MIME type is detected from the content; non-images are rejected.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, CoreError> {
        let name = name.into();
        let mime_type = match infer::get(bytes) {
            Some(kind) if matches!(kind.matcher_type(), infer::MatcherType::Image) => {
                kind.mime_type().to_string()
            }
            Some(kind) => {
                tracing::warn!(file = %name, mime = kind.mime_type(), "Rejected non-image upload");
                return Err(CoreError::InvalidImage(format!(
                    "{name} has type {}",
                    kind.mime_type()
                )));
            }
            None => {
                tracing::warn!(file = %name, "Rejected upload of unknown type");
                return Err(CoreError::InvalidImage(format!("{name} has an unrecognized format")));
            }
        };

        Ok(Self {
            name,
            data: general_purpose::STANDARD.encode(bytes),
            mime_type,
        })
    }

    /// Read and encode an image file from disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &bytes)
    }

    /// Accept a `data:image/...;base64,...` URL, as produced by browser readers.
    pub fn from_data_url(name: impl Into<String>, url: &str) -> Result<Self, CoreError> {
        let payload = url
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| CoreError::InvalidImage("data URL has no payload".into()))?;
        let bytes = general_purpose::STANDARD.decode(payload.trim())?;
        Self::from_bytes(name, &bytes)
    }

    /// Decoded size of the payload in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        general_purpose::STANDARD
            .decode(&self.data)
            .map(|b| b.len())
            .unwrap_or(0)
    }
}

/// The two timeframe slots an analysis needs. Either may be empty while
/// the user is still uploading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartPair {
    pub higher: Option<EncodedImage>,
    pub lower: Option<EncodedImage>,
}

impl ChartPair {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.higher.is_some() && self.lower.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.higher.is_none() && self.lower.is_none()
    }

    /// Both images, or `MissingImages` when either slot is empty.
    pub fn both(&self) -> Result<(&EncodedImage, &EncodedImage), CoreError> {
        match (&self.higher, &self.lower) {
            (Some(h), Some(l)) => Ok((h, l)),
            _ => Err(CoreError::MissingImages),
        }
    }

    pub fn clear(&mut self) {
        self.higher = None;
        self.lower = None;
    }
}
