use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// ── Requests ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

// ── Responses ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

// ── Tokens ──────────────────────────────────────────────────────────

/// Result of a successful sign-up or sign-in.
#[derive(Clone)]
pub struct IdentityTokens {
    /// Stable user id (`localId`).
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
    /// Seconds until `id_token` expires.
    pub expires_in: Option<u64>,
}

impl fmt::Debug for IdentityTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTokens")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl From<AuthResponse> for IdentityTokens {
    fn from(resp: AuthResponse) -> Self {
        Self {
            user_id: resp.local_id,
            email: resp.email,
            display_name: resp.display_name.filter(|n| !n.is_empty()),
            id_token: SecretString::from(resp.id_token),
            refresh_token: SecretString::from(resp.refresh_token),
            expires_in: resp.expires_in.and_then(|s| s.parse().ok()),
        }
    }
}
