// ── Runtime client configuration ──
//
// These types describe *where* the hosted services live and which
// project key to present. They never touch disk; the CLI builds a
// `ClientConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Public Firestore REST endpoint.
pub const DEFAULT_STORE_URL: &str = "https://firestore.googleapis.com";
/// Public Identity Toolkit endpoint.
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";
/// Public Cloudinary upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.cloudinary.com";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additionally trust this PEM file.
    CustomCa(PathBuf),
}

/// Image host settings. Absent means cover uploads are disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub endpoint: Url,
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
    /// Size ceiling for a single image, in bytes.
    pub max_bytes: usize,
}

/// Everything needed to reach one Trackademia project.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub project_id: String,
    /// Public web API key of the project.
    pub api_key: SecretString,
    pub store_url: Url,
    pub identity_url: Url,
    pub upload: Option<UploadConfig>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config pointing at the public endpoints with no uploads.
    pub fn new(project_id: impl Into<String>, api_key: SecretString) -> Result<Self, url::ParseError> {
        Ok(Self {
            project_id: project_id.into(),
            api_key,
            store_url: Url::parse(DEFAULT_STORE_URL)?,
            identity_url: Url::parse(DEFAULT_IDENTITY_URL)?,
            upload: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        })
    }
}
