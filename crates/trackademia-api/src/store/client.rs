// Hand-crafted async HTTP client for the document store REST API.
//
// Every request carries the project API key as `?key=`. Once a user has
// signed in, their ID token rides along as a bearer token so the store's
// security rules can see who is asking.

use std::sync::{PoisonError, RwLock};

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::query::Query;
use super::value::{Document, Fields};
use crate::Error;
use crate::error::body_preview;
use crate::transport::TransportConfig;

// ── Error response shape ────────────────────────────────────────────

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryEntry {
    #[serde(default)]
    document: Option<Document>,
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for one project's default database.
pub struct DocumentClient {
    http: reqwest::Client,
    /// `…/v1/projects/{project}/databases/(default)/documents`
    documents_url: Url,
    run_query_url: Url,
    api_key: Option<SecretString>,
    id_token: RwLock<Option<SecretString>>,
}

impl DocumentClient {
    // ── Constructors ────────────────────────────────────────────────

    /// Build a client with its own `reqwest::Client`.
    pub fn new(
        store_url: &Url,
        project_id: &str,
        api_key: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(store_url, project_id, api_key, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        store_url: &Url,
        project_id: &str,
        api_key: Option<SecretString>,
        http: reqwest::Client,
    ) -> Result<Self, Error> {
        let root = store_url.as_str().trim_end_matches('/');
        let documents = format!("{root}/v1/projects/{project_id}/databases/(default)/documents");
        let documents_url = Url::parse(&documents)?;
        if documents_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let run_query_url = Url::parse(&format!("{documents}:runQuery"))?;

        Ok(Self {
            http,
            documents_url,
            run_query_url,
            api_key,
            id_token: RwLock::new(None),
        })
    }

    // ── Auth ────────────────────────────────────────────────────────

    /// Install (or clear) the signed-in user's ID token.
    pub fn set_id_token(&self, token: Option<SecretString>) {
        *self.id_token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn has_id_token(&self) -> bool {
        self.id_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn authorize(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(key) = &self.api_key {
            builder = builder.query(&[("key", key.expose_secret())]);
        }
        let guard = self.id_token.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = guard.as_ref() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    // ── URL builder ─────────────────────────────────────────────────

    fn document_url(&self, segments: &[&str]) -> Url {
        let mut url = self.documents_url.clone();
        // `cannot_be_a_base` was ruled out at construction.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Create a document. With `document_id` the caller chooses the id,
    /// otherwise the store generates one.
    pub async fn create_document(
        &self,
        collection: &str,
        document_id: Option<&str>,
        fields: Fields,
    ) -> Result<Document, Error> {
        let url = self.document_url(&[collection]);
        debug!("POST {url}");

        let mut builder = self.http.post(url).json(&json!({ "fields": fields }));
        if let Some(id) = document_id {
            builder = builder.query(&[("documentId", id)]);
        }
        let resp = self.authorize(builder).send().await?;
        self.handle_response(resp).await
    }

    /// Fetch one document. A missing document is `Ok(None)`, not an error.
    pub async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        let url = self.document_url(&[collection, id]);
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(resp).await.map(Some)
    }

    /// Overwrite exactly the supplied fields of an existing document.
    ///
    /// Fails with a 404 `Store` error when the document does not exist.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, Error> {
        let url = self.document_url(&[collection, id]);
        debug!("PATCH {url} fields={:?}", fields.keys().collect::<Vec<_>>());

        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let builder = self
            .http
            .patch(url)
            .query(&params)
            .json(&json!({ "fields": fields }));
        let resp = self.authorize(builder).send().await?;
        self.handle_response(resp).await
    }

    /// Delete a document. Deleting an absent document succeeds.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), Error> {
        let url = self.document_url(&[collection, id]);
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url)).send().await?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Run a structured query and collect the matching documents in order.
    pub async fn run_query(&self, query: &Query) -> Result<Vec<Document>, Error> {
        let url = self.run_query_url.clone();
        debug!("POST {url} collection={}", query.collection);

        let builder = self.http.post(url).json(&query.to_request_body());
        let resp = self.authorize(builder).send().await?;
        let entries: Vec<RunQueryEntry> = self.handle_response(resp).await?;

        // Entries without a document only carry read-time/progress info.
        Ok(entries.into_iter().filter_map(|e| e.document).collect())
    }

    // ── Response handling ───────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = body_preview(&body);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorEnvelope>(&raw).ok();

        let message = parsed
            .as_ref()
            .and_then(|e| e.error.message.clone())
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    body_preview(&raw)
                }
            });

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Error::PermissionDenied { message };
        }

        Error::Store {
            status: status.as_u16(),
            message,
            code: parsed.and_then(|e| e.error.status),
        }
    }
}
