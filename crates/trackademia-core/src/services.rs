// ── Service wiring ──
//
// Builds every client once from a `ClientConfig` and hands out shared
// handles. Nothing here is global: the CLI (or a test) owns the
// `Services` value and passes it down.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use trackademia_api::transport::{TlsMode, TransportConfig};
use trackademia_api::{DocumentClient, IdentityClient, UploadClient};

use crate::config::{ClientConfig, TlsVerification};
use crate::error::CoreError;
use crate::gateway::DataGateway;
use crate::identity::IdentityGateway;
use crate::library::Library;
use crate::ports::{DocumentStore, IdentityProvider};
use crate::session::SessionController;

/// The process-wide set of gateways.
#[derive(Clone)]
pub struct Services {
    data: DataGateway,
    identity: IdentityGateway,
    session: SessionController,
    uploads: Option<Arc<UploadClient>>,
}

impl Services {
    /// Build HTTP clients for every configured service. Does not touch the network.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);

        let store = DocumentClient::new(
            &config.store_url,
            &config.project_id,
            Some(config.api_key.clone()),
            &transport,
        )?;
        let provider = IdentityClient::new(&config.identity_url, config.api_key.clone(), &transport)?;

        let uploads = match &config.upload {
            Some(upload) => Some(Arc::new(UploadClient::new(
                &upload.endpoint,
                &upload.cloud_name,
                upload.upload_preset.clone(),
                upload.folder.clone(),
                &transport,
            )?
            .with_max_bytes(upload.max_bytes))),
            None => None,
        };

        debug!(project = %config.project_id, uploads = uploads.is_some(), "services built");
        Ok(Self::from_ports(Arc::new(store), Arc::new(provider)).with_uploads(uploads))
    }

    /// Wire gateways over arbitrary port implementations.
    pub fn from_ports(store: Arc<dyn DocumentStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        let data = DataGateway::new(store);
        let identity = IdentityGateway::new(provider, data.clone());
        let session = SessionController::new(identity.clone(), data.clone());
        Self {
            data,
            identity,
            session,
            uploads: None,
        }
    }

    #[must_use]
    pub fn with_uploads(mut self, uploads: Option<Arc<UploadClient>>) -> Self {
        self.uploads = uploads;
        self
    }

    pub fn data(&self) -> &DataGateway {
        &self.data
    }

    pub fn identity(&self) -> &IdentityGateway {
        &self.identity
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Library of the signed-in user.
    pub fn library(&self) -> Result<Library, CoreError> {
        let identity = self.session.state().identity.ok_or(CoreError::NotSignedIn)?;
        Ok(Library::new(self.data.clone(), identity.id).with_uploads(self.uploads.clone()))
    }

    /// Release the session's identity subscription.
    pub async fn shutdown(&self) {
        self.session.deactivate().await;
    }

    /// Build, activate the session, run `f`, shut down.
    pub async fn oneshot<F, Fut, T>(config: &ClientConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Services) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let services = Self::new(config)?;
        services.session.activate().await;
        let result = f(services.clone()).await;
        services.shutdown().await;
        result
    }
}

fn build_transport(config: &ClientConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}
