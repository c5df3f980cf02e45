// Unsigned image uploads to a Cloudinary-style media host.
//
// POST {upload_url}/v1_1/{cloud_name}/image/upload (multipart: file, upload_preset, folder)
// The host answers with `secure_url` on success or `{"error":{"message"}}`.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::Error;
use crate::error::body_preview;
use crate::transport::TransportConfig;

/// Largest accepted image, 10 MiB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types the host accepts for covers.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const ERROR_PREFIX: &str = "failed to upload image";

/// An image ready for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    public_id: Option<String>,
    #[serde(default)]
    error: Option<UploadError>,
}

#[derive(Deserialize)]
struct UploadError {
    message: String,
}

/// Client bound to one cloud, preset, and folder.
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: Url,
    upload_preset: String,
    folder: String,
    max_bytes: usize,
}

impl UploadClient {
    pub fn new(
        upload_url: &Url,
        cloud_name: &str,
        upload_preset: impl Into<String>,
        folder: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(upload_url, cloud_name, upload_preset, folder, http)
    }

    pub fn from_reqwest(
        upload_url: &Url,
        cloud_name: &str,
        upload_preset: impl Into<String>,
        folder: impl Into<String>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let root = upload_url.as_str().trim_end_matches('/');
        let endpoint = Url::parse(&format!("{root}/v1_1/{cloud_name}/image/upload"))?;
        Ok(Self {
            http,
            endpoint,
            upload_preset: upload_preset.into(),
            folder: folder.into(),
            max_bytes: MAX_UPLOAD_BYTES,
        })
    }

    /// Lower the size ceiling (never above [`MAX_UPLOAD_BYTES`]).
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes.min(MAX_UPLOAD_BYTES);
        self
    }

    /// Reject files the host would refuse, without touching the network.
    pub fn validate(&self, file: &ImageFile) -> Result<(), Error> {
        if file.bytes.is_empty() {
            return Err(upload_error("file is empty"));
        }
        if file.bytes.len() > self.max_bytes {
            return Err(upload_error(&format!(
                "file is {} bytes, limit is {} bytes",
                file.bytes.len(),
                self.max_bytes
            )));
        }
        let content_type = file.content_type.to_ascii_lowercase();
        if !SUPPORTED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(upload_error(&format!(
                "unsupported file type {:?}; expected one of {}",
                file.content_type,
                SUPPORTED_IMAGE_TYPES.join(", ")
            )));
        }
        Ok(())
    }

    /// Upload an image and return its public HTTPS URL.
    pub async fn upload_image(&self, file: ImageFile) -> Result<String, Error> {
        self.validate(&file)?;
        debug!(
            "POST {} file={} bytes={}",
            self.endpoint,
            file.file_name,
            file.bytes.len()
        );

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type.to_ascii_lowercase())?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone());

        let resp = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        let parsed: UploadResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                Error::Deserialization {
                    message: format!("{e} (body preview: {:?})", body_preview(&text)),
                    body: text.clone(),
                }
            } else {
                upload_error(&format!("HTTP {status}"))
            }
        })?;

        if let Some(err) = parsed.error {
            return Err(upload_error(&err.message));
        }
        match parsed.secure_url {
            Some(url) if status.is_success() => {
                info!(
                    public_id = parsed.public_id.as_deref().unwrap_or_default(),
                    "image uploaded"
                );
                Ok(url)
            }
            _ => Err(upload_error(&format!("HTTP {status} without a secure_url"))),
        }
    }
}

fn upload_error(detail: &str) -> Error {
    Error::Upload {
        message: format!("{ERROR_PREFIX}: {detail}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> UploadClient {
        let url = Url::parse("https://media.example.test").unwrap();
        UploadClient::from_reqwest(&url, "demo", "covers", "books", reqwest::Client::new())
            .unwrap()
    }

    fn image(content_type: &str, len: usize) -> ImageFile {
        ImageFile {
            file_name: "cover.png".into(),
            content_type: content_type.into(),
            bytes: Bytes::from(vec![7_u8; len]),
        }
    }

    #[test]
    fn accepts_supported_types_regardless_of_case() {
        let client = client();
        assert!(client.validate(&image("image/png", 16)).is_ok());
        assert!(client.validate(&image("IMAGE/WEBP", 16)).is_ok());
    }

    #[test]
    fn rejects_unsupported_type() {
        let err = client().validate(&image("application/pdf", 16)).unwrap_err();
        assert!(err.to_string().starts_with("failed to upload image"));
        assert!(err.to_string().contains("application/pdf"));
    }

    #[test]
    fn rejects_empty_and_oversized_files() {
        let client = client().with_max_bytes(32);
        assert!(client.validate(&image("image/gif", 0)).is_err());
        assert!(client.validate(&image("image/gif", 32)).is_ok());
        assert!(client.validate(&image("image/gif", 33)).is_err());
    }
}
