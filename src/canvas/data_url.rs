use std::fmt;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};

use super::{CanvasError, CanvasResult, MIME_IMAGE_PNG};

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// An image encoded as `data:<mime>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub payload: String,
}

impl DataUrl {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            payload: STANDARD.encode(bytes),
        }
    }

    pub fn parse(input: &str) -> CanvasResult<Self> {
        let rest = input
            .strip_prefix(DATA_URL_SCHEME)
            .ok_or_else(|| malformed("missing data: scheme"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| malformed("missing ',' separator"))?;
        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| malformed("payload is not base64 encoded"))?;
        STANDARD
            .decode(payload.as_bytes())
            .map_err(|source| CanvasError::InvalidBase64 { source })?;
        let mime_type = if mime.is_empty() {
            MIME_IMAGE_PNG.to_string()
        } else {
            mime.to_string()
        };

        Ok(Self {
            mime_type,
            payload: payload.to_string(),
        })
    }

    pub fn decode_payload(&self) -> CanvasResult<Vec<u8>> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|source| CanvasError::InvalidBase64 { source })
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{DATA_URL_SCHEME}{}{BASE64_MARKER},{}",
            self.mime_type, self.payload
        )
    }
}

fn malformed(message: &str) -> CanvasError {
    CanvasError::MalformedDataUrl {
        message: message.to_string(),
    }
}

pub fn encode_png_data_url(image: &RgbaImage) -> CanvasResult<String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|source| CanvasError::Encode { source })?;
    Ok(DataUrl::from_bytes(MIME_IMAGE_PNG, &bytes).to_string())
}

pub fn decode_image_bytes(bytes: &[u8]) -> CanvasResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgba8())
        .map_err(|source| CanvasError::Decode { source })
}

pub fn decode_data_url(input: &str) -> CanvasResult<RgbaImage> {
    let url = DataUrl::parse(input)?;
    decode_image_bytes(&url.decode_payload()?)
}
