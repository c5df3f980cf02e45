// ── Session controller ──
//
// Process-wide `{identity, profile, is_loading}` behind a watch channel.
// The controller is the only writer: it listens to the identity gateway,
// fetches the matching account on every identity change, and re-reads the
// account after every profile write.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures_core::Stream;
use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::gateway::DataGateway;
use crate::guard::{self, Access, Decision};
use crate::identity::{Identity, IdentityGateway, Subscription};
use crate::model::{Account, AccountPatch};

// ── SessionState ────────────────────────────────────────────────────

/// Snapshot of the session as readers see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub profile: Option<Arc<Account>>,
    /// True until the first identity event has been handled, and again
    /// while the profile of a newly signed-in user is being fetched.
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            identity: None,
            profile: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Evaluate the route guard against this snapshot.
    pub fn decide(&self, access: Access) -> Decision {
        guard::evaluate_access(self, access)
    }

    fn is_settled_for(&self, user: Option<&Identity>) -> bool {
        !self.is_loading && self.identity.as_ref().map(|i| &i.id) == user.map(|i| &i.id)
    }
}

// ── SessionController ───────────────────────────────────────────────

/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    identity: IdentityGateway,
    data: DataGateway,
    state: watch::Sender<SessionState>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionController {
    /// Create an inactive controller. Call [`activate`](Self::activate) to start
    /// following the identity gateway.
    pub fn new(identity: IdentityGateway, data: DataGateway) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(SessionInner {
                identity,
                data,
                state,
                subscription: Mutex::new(None),
            }),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Subscribe to identity changes. Idempotent.
    pub async fn activate(&self) {
        let mut slot = self.inner.subscription.lock().await;
        if slot.is_some() {
            return;
        }

        // Weak: the subscription lives inside `SessionInner`.
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let subscription = self.inner.identity.subscribe(move |identity| {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    inner.on_identity(identity).await;
                }
            }
        });
        *slot = Some(subscription);
        debug!("session activated");
    }

    /// Release the identity subscription and wait for any in-flight handler.
    pub async fn deactivate(&self) {
        let subscription = self.inner.subscription.lock().await.take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe().await;
            debug!("session deactivated");
        }
    }

    pub async fn is_active(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .await
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> SessionWatch {
        SessionWatch::new(self.inner.state.subscribe())
    }

    /// Route decision for the current snapshot.
    pub fn guard(&self, access: Access) -> Decision {
        self.state().decide(access)
    }

    /// Activate if needed and wait for the first settled snapshot.
    pub async fn ready(&self) -> SessionState {
        self.activate().await;
        self.wait_until(|s| !s.is_loading).await
    }

    // ── Identity passthroughs ───────────────────────────────────────

    /// Sign up through the identity gateway and wait until the session reflects it.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: Option<&str>,
    ) -> Result<SessionState, CoreError> {
        self.activate().await;
        let identity = self
            .inner
            .identity
            .sign_up(email, password, display_name)
            .await?;
        Ok(self.wait_until(|s| s.is_settled_for(Some(&identity))).await)
    }

    /// Sign in and wait until the session has loaded the user's profile.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SessionState, CoreError> {
        self.activate().await;
        let identity = self.inner.identity.sign_in(email, password).await?;
        Ok(self.wait_until(|s| s.is_settled_for(Some(&identity))).await)
    }

    pub async fn sign_out(&self) -> SessionState {
        self.activate().await;
        self.inner.identity.sign_out();
        self.wait_until(|s| s.is_settled_for(None)).await
    }

    // ── Profile writes ──────────────────────────────────────────────

    /// Write `patch` to the signed-in user's account, then replace the cached
    /// profile with a fresh read.
    pub async fn update_profile(
        &self,
        patch: &AccountPatch,
    ) -> Result<Option<Arc<Account>>, CoreError> {
        let identity = self.state().identity.ok_or(CoreError::NotSignedIn)?;

        self.inner
            .data
            .update::<Account>(&identity.id, patch)
            .await?;
        let profile = self
            .inner
            .data
            .get::<Account>(&identity.id)
            .await?
            .map(Arc::new);

        self.inner.state.send_modify(|s| {
            if s.identity.as_ref().map(|i| &i.id) == Some(&identity.id) {
                s.profile.clone_from(&profile);
            }
        });
        info!(user = %identity.id, "profile updated");
        Ok(profile)
    }

    /// Record the degree program, the one field the profile-setup step asks for.
    pub async fn complete_profile(&self, degree: &str) -> Result<Arc<Account>, CoreError> {
        let degree = degree.trim();
        if degree.is_empty() {
            return Err(CoreError::validation("Please enter your degree"));
        }
        let patch = AccountPatch {
            degree: Some(degree.to_owned()),
            ..AccountPatch::default()
        };
        self.update_profile(&patch)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                kind: "account",
                id: self
                    .state()
                    .identity
                    .map(|i| i.id.to_string())
                    .unwrap_or_default(),
            })
    }

    async fn wait_until(&self, predicate: impl FnMut(&SessionState) -> bool) -> SessionState {
        let mut rx = self.inner.state.subscribe();
        // The sender lives as long as `self`, so the wait cannot fail.
        match rx.wait_for(predicate).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

impl SessionInner {
    async fn on_identity(&self, identity: Option<Identity>) {
        let Some(identity) = identity else {
            self.state.send_modify(|s| {
                s.identity = None;
                s.profile = None;
                s.is_loading = false;
            });
            debug!("session cleared");
            return;
        };

        let switched = self.state.borrow().identity.as_ref().map(|i| &i.id) != Some(&identity.id);
        if switched {
            self.state.send_modify(|s| {
                s.identity = Some(identity.clone());
                s.profile = None;
                s.is_loading = true;
            });
        }

        let profile = match self.data.get::<Account>(&identity.id).await {
            Ok(Some(account)) => Some(Arc::new(account)),
            Ok(None) => {
                warn!(user = %identity.id, "no account record for signed-in user");
                None
            }
            Err(e) => {
                warn!(user = %identity.id, error = %e, "profile fetch failed");
                None
            }
        };

        self.state.send_modify(|s| {
            s.identity = Some(identity);
            s.profile = profile;
            s.is_loading = false;
        });
    }
}

// ── SessionWatch ────────────────────────────────────────────────────

/// Read-only subscription to session snapshots.
pub struct SessionWatch {
    current: SessionState,
    receiver: watch::Receiver<SessionState>,
}

impl SessionWatch {
    fn new(mut receiver: watch::Receiver<SessionState>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &SessionState {
        &self.current
    }

    /// Wait for the next change. `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> SessionStream {
        SessionStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` of session snapshots.
pub struct SessionStream {
    inner: WatchStream<SessionState>,
}

impl Stream for SessionStream {
    type Item = SessionState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
