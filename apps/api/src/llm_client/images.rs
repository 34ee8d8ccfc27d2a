//! Reference images attached to a generation request.

use base64::Engine;
use bytes::Bytes;

const FALLBACK_MIME: &str = "application/octet-stream";

/// An uploaded image and the MIME type it is sent to the provider under.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub data: Bytes,
    pub mime_type: String,
}

impl ReferenceImage {
    pub fn new(data: Bytes, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Takes the part's declared `image/*` content type if there is one,
    /// otherwise guesses from the file name's extension.
    pub fn from_upload(data: Bytes, content_type: Option<&str>, file_name: Option<&str>) -> Self {
        let declared = content_type
            .and_then(|ct| ct.parse::<mime_guess::Mime>().ok())
            .filter(|mime| mime.type_().as_str() == "image")
            .map(|mime| mime.essence_str().to_owned());

        let mime_type = declared
            .or_else(|| {
                file_name
                    .and_then(|name| mime_guess::from_path(name).first())
                    .map(|mime| mime.essence_str().to_owned())
            })
            .unwrap_or_else(|| FALLBACK_MIME.to_string());

        Self::new(data, mime_type)
    }

    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// `data:` URL form used by OpenAI-style `image_url` parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}
