use thiserror::Error;

/// Top-level error type for the `trackademia-api` crate.
///
/// Covers every failure mode across the three hosted surfaces:
/// identity provider, document store, and image host.
/// `trackademia-core` maps these into its own error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Identity ────────────────────────────────────────────────────
    /// The identity provider refused the request (`{"error":{"message":"EMAIL_EXISTS"}}`).
    #[error("Identity provider rejected the request: {message}")]
    Identity { rejection: Rejection, message: String },

    // ── Document store ──────────────────────────────────────────────
    /// Security rules or a missing/expired ID token blocked the call.
    #[error("Permission denied by document store: {message}")]
    PermissionDenied { message: String },

    /// Structured error from the document store (`{"error":{code,message,status}}`).
    #[error("Document store error (HTTP {status}): {message}")]
    Store {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Image host ──────────────────────────────────────────────────
    /// Upload refused locally (size/type) or by the media host.
    #[error("{message}")]
    Upload { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Why the identity provider turned a request down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Unknown email, wrong password, disabled or malformed account.
    InvalidCredentials,
    /// Sign-up with an email that already has an account.
    EmailExists,
    /// Password does not meet the provider's minimum strength.
    WeakPassword,
    /// Anything else the provider reports.
    Other,
}

impl Rejection {
    /// Classify a provider error code such as `"WEAK_PASSWORD : Password should be at least 6 characters"`.
    pub fn from_code(code: &str) -> Self {
        let head = code.split(':').next().unwrap_or_default().trim();
        match head {
            "EMAIL_EXISTS" => Self::EmailExists,
            "EMAIL_NOT_FOUND"
            | "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL"
            | "USER_DISABLED" => Self::InvalidCredentials,
            other if other.starts_with("WEAK_PASSWORD") => Self::WeakPassword,
            _ => Self::Other,
        }
    }
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Store { status: 404, .. } => true,
            _ => false,
        }
    }
}

/// Cut a response body down to something fit for an error message.
pub(crate) fn body_preview(body: &str) -> String {
    body.chars().take(200).collect()
}
