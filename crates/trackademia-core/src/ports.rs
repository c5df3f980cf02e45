//! Contracts between the core and the hosted services.
//!
//! The gateways only ever talk to these traits. Production wires in the
//! `trackademia-api` HTTP clients; tests wire in in-memory fakes.

use async_trait::async_trait;
use secrecy::SecretString;

use trackademia_api::{Document, DocumentClient, Fields, IdentityClient, Query};

use crate::identity::Identity;
use crate::model::RecordId;

/// Port errors are the transport crate's errors; the gateways translate.
pub type PortResult<T> = Result<T, trackademia_api::Error>;

/// Remote document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document. `id` pins the document id; `None` lets the store pick.
    async fn create(&self, collection: &str, id: Option<&str>, fields: Fields)
    -> PortResult<Document>;

    /// `Ok(None)` when no document has this id.
    async fn get(&self, collection: &str, id: &str) -> PortResult<Option<Document>>;

    async fn query(&self, query: &Query) -> PortResult<Vec<Document>>;

    /// Overwrite exactly the given fields of an existing document.
    async fn patch(&self, collection: &str, id: &str, fields: Fields) -> PortResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()>;

    /// Present (or stop presenting) the signed-in user's token on later calls.
    fn authorize(&self, _id_token: Option<SecretString>) {}
}

/// Email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &SecretString) -> PortResult<Identity>;

    async fn sign_in(&self, email: &str, password: &SecretString) -> PortResult<Identity>;

    async fn set_display_name(&self, identity: &Identity, display_name: &str) -> PortResult<()>;
}

// ── HTTP adapters ───────────────────────────────────────────────────

#[async_trait]
impl DocumentStore for DocumentClient {
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> PortResult<Document> {
        self.create_document(collection, id, fields).await
    }

    async fn get(&self, collection: &str, id: &str) -> PortResult<Option<Document>> {
        self.get_document(collection, id).await
    }

    async fn query(&self, query: &Query) -> PortResult<Vec<Document>> {
        self.run_query(query).await
    }

    async fn patch(&self, collection: &str, id: &str, fields: Fields) -> PortResult<()> {
        self.patch_document(collection, id, fields).await.map(|_| ())
    }

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()> {
        self.delete_document(collection, id).await
    }

    fn authorize(&self, id_token: Option<SecretString>) {
        self.set_id_token(id_token);
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_up(&self, email: &str, password: &SecretString) -> PortResult<Identity> {
        let tokens = IdentityClient::sign_up(self, email, password).await?;
        Ok(Identity::from(tokens))
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> PortResult<Identity> {
        let tokens = self.sign_in_with_password(email, password).await?;
        Ok(Identity::from(tokens))
    }

    async fn set_display_name(&self, identity: &Identity, display_name: &str) -> PortResult<()> {
        self.update_profile(identity.id_token(), display_name).await
    }
}

impl From<trackademia_api::IdentityTokens> for Identity {
    fn from(tokens: trackademia_api::IdentityTokens) -> Self {
        Identity::new(
            RecordId::from(tokens.user_id),
            tokens.email,
            tokens.display_name,
            tokens.id_token,
        )
    }
}
