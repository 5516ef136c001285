use crate::error::{FusionError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An image carried as a `data:<mime>;base64,<payload>` URI.
///
/// Inputs and generated artifacts share this shape, so an artifact can be
/// fed straight back as an input or written to disk with [`decode`](Self::decode).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedImage {
    uri: String,
    // byte offset of the payload inside `uri`
    payload_at: usize,
}

impl EncodedImage {
    pub fn from_data_uri(uri: impl Into<String>) -> Result<Self> {
        let uri = uri.into();
        let rest = uri.strip_prefix(DATA_PREFIX).ok_or_else(|| {
            FusionError::InvalidImage("expected a data URI starting with 'data:'".into())
        })?;
        let marker = rest.find(BASE64_MARKER).ok_or_else(|| {
            FusionError::InvalidImage("data URI is not base64 encoded".into())
        })?;

        let mime = &rest[..marker];
        if !mime.starts_with("image/") {
            return Err(FusionError::InvalidImage(format!(
                "unsupported media type '{}'",
                mime
            )));
        }

        let payload_at = DATA_PREFIX.len() + marker + BASE64_MARKER.len();
        let payload = uri[payload_at..].trim();
        if payload.is_empty() {
            return Err(FusionError::InvalidImage("image payload is empty".into()));
        }
        BASE64
            .decode(payload)
            .map_err(|e| FusionError::InvalidImage(format!("payload is not valid base64: {}", e)))?;

        Ok(Self { uri, payload_at })
    }

    pub fn from_base64(mime_type: &str, data: &str) -> Result<Self> {
        Self::from_data_uri(format!("{DATA_PREFIX}{mime_type}{BASE64_MARKER}{data}"))
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self> {
        Self::from_base64(mime_type, &BASE64.encode(bytes))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = mime_for_path(path).ok_or_else(|| {
            FusionError::InvalidImage(format!("unrecognised image extension: {}", path.display()))
        })?;
        let bytes = std::fs::read(path)?;
        log::debug!("Encoded {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(mime_type, &bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.uri[DATA_PREFIX.len()..self.payload_at - BASE64_MARKER.len()]
    }

    pub fn base64_data(&self) -> &str {
        &self.uri[self.payload_at..]
    }

    pub fn as_data_uri(&self) -> &str {
        &self.uri
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.base64_data().trim())
            .map_err(|e| FusionError::InvalidImage(format!("base64 decode failed: {}", e)))
    }

    /// File extension matching the mime type, for saving artifacts.
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

// Payloads run to megabytes, keep them out of logs.
impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type())
            .field("payload_len", &self.base64_data().len())
            .finish()
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = FusionError;

    fn try_from(uri: String) -> Result<Self> {
        Self::from_data_uri(uri)
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.uri
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn label(&self) -> &'static str {
        match self {
            Slot::First => "First Person",
            Slot::Second => "Second Person",
        }
    }
}

/// The two input positions. Setting a slot replaces whatever was there.
#[derive(Debug, Clone, Default)]
pub struct ImageSlots {
    first: Option<EncodedImage>,
    second: Option<EncodedImage>,
}

impl ImageSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: Slot, image: EncodedImage) {
        log::debug!("{} image set: {:?}", slot.label(), image);
        match slot {
            Slot::First => self.first = Some(image),
            Slot::Second => self.second = Some(image),
        }
    }

    pub fn with(mut self, slot: Slot, image: EncodedImage) -> Self {
        self.set(slot, image);
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&EncodedImage> {
        match slot {
            Slot::First => self.first.as_ref(),
            Slot::Second => self.second.as_ref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    pub fn pair(&self) -> Option<(&EncodedImage, &EncodedImage)> {
        Some((self.first.as_ref()?, self.second.as_ref()?))
    }
}
