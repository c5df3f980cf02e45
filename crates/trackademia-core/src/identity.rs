// ── Identity gateway ──
//
// Owns "who is signed in". Sign-up/sign-in/sign-out publish into a watch
// channel; `subscribe` turns that channel into listener callbacks, one
// spawned task per listener, released through a `Subscription`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::DataGateway;
use crate::model::{Account, NewAccount, RecordId};
use crate::ports::IdentityProvider;

// ── Identity ────────────────────────────────────────────────────────

/// The signed-in user as reported by the identity provider.
#[derive(Clone)]
pub struct Identity {
    pub id: RecordId,
    pub email: String,
    pub display_name: Option<String>,
    id_token: SecretString,
}

impl Identity {
    pub fn new(
        id: RecordId,
        email: impl Into<String>,
        display_name: Option<String>,
        id_token: SecretString,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            display_name,
            id_token,
        }
    }

    /// Bearer token proving this identity to the document store.
    pub fn id_token(&self) -> &SecretString {
        &self.id_token
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Tokens are refreshed independently of who the user is.
impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.email == other.email && self.display_name == other.display_name
    }
}

impl Eq for Identity {}

// ── Subscription ────────────────────────────────────────────────────

/// Handle to a registered identity listener.
///
/// Dropping it stops further callbacks; [`unsubscribe`](Self::unsubscribe)
/// additionally waits for an in-flight callback to finish.
pub struct Subscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub async fn unsubscribe(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!(error = %e, "identity listener panicked");
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Gateway ─────────────────────────────────────────────────────────

/// Cheaply cloneable handle over the identity provider.
#[derive(Clone)]
pub struct IdentityGateway {
    inner: Arc<IdentityInner>,
}

struct IdentityInner {
    provider: Arc<dyn IdentityProvider>,
    data: DataGateway,
    current: watch::Sender<Option<Identity>>,
}

impl IdentityGateway {
    pub fn new(provider: Arc<dyn IdentityProvider>, data: DataGateway) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(IdentityInner {
                provider,
                data,
                current,
            }),
        }
    }

    /// Who is signed in right now.
    pub fn current(&self) -> Option<Identity> {
        self.inner.current.borrow().clone()
    }

    /// Raw change feed; prefer [`subscribe`](Self::subscribe) for callbacks.
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.inner.current.subscribe()
    }

    /// Create an account, sign it in, and provision its `accounts` record.
    ///
    /// Provisioning is best effort: if the record write fails the identity
    /// still exists and is signed in, and the failure is only logged.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: Option<&str>,
    ) -> Result<Identity, CoreError> {
        let mut identity = self
            .inner
            .provider
            .sign_up(email, password)
            .await
            .map_err(CoreError::from_identity)?;

        if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
            match self.inner.provider.set_display_name(&identity, name).await {
                Ok(()) => identity.display_name = Some(name.to_owned()),
                Err(e) => warn!(user = %identity.id, error = %e, "failed to set display name"),
            }
        }

        self.inner.data.authorize(Some(identity.id_token().clone()));
        let draft = NewAccount {
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
        };
        if let Err(e) = self
            .inner
            .data
            .create_with_id::<Account>(&identity.id, &draft)
            .await
        {
            warn!(
                user = %identity.id,
                error = %e,
                "account record not provisioned; identity exists without a profile"
            );
        }

        info!(user = %identity.id, "signed up");
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, CoreError> {
        let identity = self
            .inner
            .provider
            .sign_in(email, password)
            .await
            .map_err(CoreError::from_identity)?;

        self.inner.data.authorize(Some(identity.id_token().clone()));
        info!(user = %identity.id, "signed in");
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    /// Forget the current identity. Purely local.
    pub fn sign_out(&self) {
        self.inner.data.authorize(None);
        if self.current().is_some() {
            info!("signed out");
        }
        self.publish(None);
    }

    /// Register `listener`. It runs once right away with the current identity,
    /// then after every change, until the returned handle is released.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<F, Fut>(&self, mut listener: F) -> Subscription
    where
        F: FnMut(Option<Identity>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = self.inner.current.subscribe();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let first = rx.borrow_and_update().clone();
            tokio::select! {
                () = token.cancelled() => return,
                () = listener(first) => {}
            }

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let next = rx.borrow_and_update().clone();
                        tokio::select! {
                            () = token.cancelled() => break,
                            () = listener(next) => {}
                        }
                    }
                }
            }
            debug!("identity listener released");
        });

        Subscription {
            cancel,
            handle: Some(handle),
        }
    }

    fn publish(&self, identity: Option<Identity>) {
        // Always store the fresh token; only wake listeners when the user changes.
        self.inner.current.send_if_modified(|current| {
            let changed = *current != identity;
            *current = identity;
            changed
        });
    }
}
