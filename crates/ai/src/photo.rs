use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::result::AiError;

/// Decoded photo payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoData {
    /// Decode a `data:<mime>;base64,<payload>` URL or a bare base64 string.
    ///
    /// Bare payloads are assumed to be JPEG, matching what phone cameras upload.
    pub fn from_data_url(input: &str) -> Result<Self, AiError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AiError::InvalidInput("photo data is empty".to_string()));
        }

        let (mime_type, payload) = match input.split_once(',') {
            Some((header, payload)) => {
                let mime = header
                    .strip_prefix("data:")
                    .and_then(|h| h.split(';').next())
                    .filter(|m| !m.is_empty())
                    .unwrap_or("image/jpeg");
                (mime.to_string(), payload)
            }
            None => ("image/jpeg".to_string(), input),
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| AiError::InvalidInput(format!("photo data is not valid base64: {e}")))?;

        if bytes.is_empty() {
            return Err(AiError::InvalidInput("photo data decodes to zero bytes".to_string()));
        }

        Ok(Self { mime_type, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_PIXEL_GIF: &str =
        "data:image/gif;base64,R0lGODlhAQABAIABAP8AAP///yH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==";

    #[test]
    fn decodes_data_url() {
        let photo = PhotoData::from_data_url(RED_PIXEL_GIF).unwrap();
        assert_eq!(photo.mime_type, "image/gif");
        assert_eq!(&photo.bytes[..3], b"GIF");
    }

    #[test]
    fn bare_base64_defaults_to_jpeg() {
        let photo = PhotoData::from_data_url("R0lGODlhAQABAIABAP8AAP///yH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==").unwrap();
        assert_eq!(photo.mime_type, "image/jpeg");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            PhotoData::from_data_url("data:image/png;base64,***"),
            Err(AiError::InvalidInput(_))
        ));
        assert!(PhotoData::from_data_url("  ").is_err());
    }
}
