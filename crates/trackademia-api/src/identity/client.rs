// Email/password identity provider client.
//
// accounts:signUp, accounts:signInWithPassword, accounts:update.
// Sign-out has no remote call; callers simply drop the tokens.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::models::{AuthResponse, ErrorEnvelope, PasswordRequest, UpdateProfileRequest};
use super::IdentityTokens;
use crate::error::{Rejection, body_preview};
use crate::transport::TransportConfig;
use crate::Error;

/// Async client for the identity provider.
pub struct IdentityClient {
    http: reqwest::Client,
    /// `{identity_url}/v1/`
    base_url: Url,
    api_key: SecretString,
}

impl IdentityClient {
    pub fn new(
        identity_url: &Url,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(identity_url, api_key, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        identity_url: &Url,
        api_key: SecretString,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let root = identity_url.as_str().trim_end_matches('/');
        let base_url = Url::parse(&format!("{root}/v1/"))?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Create an email/password account and sign it in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityTokens, Error> {
        let body = PasswordRequest {
            email,
            password: password.expose_secret(),
            return_secure_token: true,
        };
        let resp: AuthResponse = self.post("accounts:signUp", &body).await?;
        Ok(resp.into())
    }

    /// Exchange email and password for tokens.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentityTokens, Error> {
        let body = PasswordRequest {
            email,
            password: password.expose_secret(),
            return_secure_token: true,
        };
        let resp: AuthResponse = self.post("accounts:signInWithPassword", &body).await?;
        Ok(resp.into())
    }

    /// Set the display name on the provider-side profile.
    pub async fn update_profile(
        &self,
        id_token: &SecretString,
        display_name: &str,
    ) -> Result<(), Error> {
        let body = UpdateProfileRequest {
            id_token: id_token.expose_secret(),
            display_name,
            return_secure_token: false,
        };
        let _: serde_json::Value = self.post("accounts:update", &body).await?;
        Ok(())
    }

    // ── HTTP ────────────────────────────────────────────────────────

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, Error> {
        // `join` would read `accounts:` as a URL scheme.
        let url = Url::parse(&format!("{}{method}", self.base_url))?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Self::parse_error(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", body_preview(&text)),
            body: text,
        })
    }

    fn parse_error(status: StatusCode, raw: &str) -> Error {
        let message = serde_json::from_str::<ErrorEnvelope>(raw)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string());

        Error::Identity {
            rejection: Rejection::from_code(&message),
            message,
        }
    }
}
