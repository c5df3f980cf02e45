// ── Core error types ──
//
// User-facing errors from trackademia-core. Callers never match on HTTP
// status codes or provider error strings; the `From<trackademia_api::Error>`
// impl folds transport-layer failures into these variants.

use strum::Display;
use thiserror::Error;

use trackademia_api::Rejection;

/// Why an identity operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    AccountAlreadyExists,
    WeakPassword,
    Network,
    Provider,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Record errors ────────────────────────────────────────────────
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("You don't have permission to access this {kind}")]
    Unauthorized { kind: &'static str, id: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Malformed {collection} document {id}: {message}")]
    Malformed {
        collection: String,
        id: String,
        message: String,
    },

    // ── Identity errors ──────────────────────────────────────────────
    #[error("{message}")]
    Auth { kind: AuthErrorKind, message: String },

    #[error("Not signed in")]
    NotSignedIn,

    // ── Store / host errors ──────────────────────────────────────────
    #[error("Persistence failed: {message}")]
    Persistence {
        message: String,
        status: Option<u16>,
    },

    #[error("{message}")]
    Upload { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Map an identity-provider failure into `Auth`.
    ///
    /// Kept apart from the blanket `From` impl because a transport failure
    /// means `Network` here but `Persistence` for store calls.
    pub fn from_identity(err: trackademia_api::Error) -> Self {
        let (kind, message) = match &err {
            trackademia_api::Error::Identity { rejection, .. } => match rejection {
                Rejection::InvalidCredentials => (
                    AuthErrorKind::InvalidCredentials,
                    "Invalid email or password".to_owned(),
                ),
                Rejection::EmailExists => (
                    AuthErrorKind::AccountAlreadyExists,
                    "An account with this email already exists".to_owned(),
                ),
                Rejection::WeakPassword => (
                    AuthErrorKind::WeakPassword,
                    "Password is too weak (use at least 6 characters)".to_owned(),
                ),
                Rejection::Other => (AuthErrorKind::Provider, err.to_string()),
            },
            trackademia_api::Error::Transport(e) => (
                AuthErrorKind::Network,
                format!("Could not reach the identity provider: {e}"),
            ),
            _ => (AuthErrorKind::Provider, err.to_string()),
        };
        Self::Auth { kind, message }
    }

    /// Failure kind for identity errors, if this is one.
    pub fn auth_kind(&self) -> Option<AuthErrorKind> {
        match self {
            Self::Auth { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<trackademia_api::Error> for CoreError {
    fn from(err: trackademia_api::Error) -> Self {
        match err {
            trackademia_api::Error::Identity { .. } => Self::from_identity(err),
            trackademia_api::Error::PermissionDenied { message } => Self::Persistence {
                message: format!("permission denied: {message}"),
                status: Some(403),
            },
            trackademia_api::Error::Store {
                status, message, ..
            } => Self::Persistence {
                message,
                status: Some(status),
            },
            trackademia_api::Error::Upload { message } => Self::Upload { message },
            trackademia_api::Error::Transport(e) => Self::Persistence {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            trackademia_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            trackademia_api::Error::Tls(msg) => Self::Config {
                message: format!("TLS error: {msg}"),
            },
            trackademia_api::Error::Deserialization { message, body: _ } => Self::Persistence {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
