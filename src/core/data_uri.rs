use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;
use tokio::fs;

use super::error::StudioError;

const DEFAULT_MIME: &str = "image/png";

/// Build a `data:` URI from a MIME type and a base64 payload
pub fn to_data_uri(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Base64 payload of a data URI. A bare base64 string is returned as-is.
pub fn payload(data_uri: &str) -> &str {
    match data_uri.split_once(',') {
        Some((_, data)) => data,
        None => data_uri,
    }
}

/// MIME type declared in a data URI header
pub fn mime_type(data_uri: &str) -> Option<&str> {
    let header = data_uri.strip_prefix("data:")?.split_once(',')?.0;
    let mime = header.split(';').next()?;
    (!mime.is_empty()).then_some(mime)
}

/// Decode the image bytes held by a data URI
pub fn decode(data_uri: &str) -> Result<Vec<u8>, StudioError> {
    BASE64
        .decode(payload(data_uri).trim())
        .map_err(|e| StudioError::InvalidSourceImage(e.to_string()))
}

/// File extension for an image MIME type
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Load an image file and encode it as a data URI
pub async fn load_file(path: &Path) -> Result<String, StudioError> {
    let data = fs::read(path).await?;
    if data.is_empty() {
        return Err(StudioError::InvalidSourceImage(format!(
            "{} is empty",
            path.display()
        )));
    }

    let mime_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => DEFAULT_MIME,
    };

    tracing::debug!("Loaded {} ({} bytes, {})", path.display(), data.len(), mime_type);
    Ok(to_data_uri(mime_type, &BASE64.encode(&data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_header_and_payload() {
        let uri = to_data_uri("image/jpeg", "AQID");
        assert_eq!(uri, "data:image/jpeg;base64,AQID");
        assert_eq!(payload(&uri), "AQID");
        assert_eq!(mime_type(&uri), Some("image/jpeg"));
        assert_eq!(decode(&uri).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn bare_payload_is_accepted() {
        assert_eq!(payload("AQID"), "AQID");
        assert_eq!(mime_type("AQID"), None);
        assert_eq!(decode("AQID").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = decode("data:image/png;base64,@@not-base64@@").unwrap_err();
        assert!(matches!(err, StudioError::InvalidSourceImage(_)));
    }

    #[tokio::test]
    async fn load_file_infers_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPG");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        let uri = load_file(&path).await.unwrap();

        assert_eq!(mime_type(&uri), Some("image/jpeg"));
        assert_eq!(decode(&uri).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn load_file_rejects_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.png");
        std::fs::write(&empty, b"").unwrap();

        assert!(matches!(
            load_file(&dir.path().join("missing.png")).await,
            Err(StudioError::Io(_))
        ));
        assert!(matches!(
            load_file(&empty).await,
            Err(StudioError::InvalidSourceImage(_))
        ));
    }
}
