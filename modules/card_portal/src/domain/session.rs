//! Who is signed in.
//!
//! [`SessionSlot`] holds the token and identity; the request gateway reads it
//! as its [`TokenSource`] while [`Session`] is the only writer.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info, instrument, warn};

use crate::contract::client::AuthApi;
use crate::contract::error::ApiError;
use crate::contract::model::{AuthResponse, Credentials, Identity};
use crate::infra::http::TokenSource;
use crate::infra::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Restoring a persisted token; nothing may be gated yet.
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub identity: Option<Identity>,
    pub phase: Phase,
}

impl SessionSnapshot {
    fn loading() -> Self {
        Self {
            token: None,
            identity: None,
            phase: Phase::Loading,
        }
    }

    fn signed_out() -> Self {
        Self {
            phase: Phase::Ready,
            ..Self::loading()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some() && self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }
}

/// Shared `{token, identity, phase}` cell. Readers never block.
pub struct SessionSlot {
    inner: ArcSwap<SessionSnapshot>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(SessionSnapshot::loading()),
        }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.inner.load_full()
    }

    fn store(&self, next: SessionSnapshot) {
        self.inner.store(Arc::new(next));
    }
}

impl Default for SessionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for SessionSlot {
    fn bearer_token(&self) -> Option<String> {
        self.inner.load().token.clone()
    }
}

pub struct Session {
    slot: Arc<SessionSlot>,
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    /// Key under which the token is persisted.
    pub const TOKEN_KEY: &'static str = "token";

    pub fn new(
        slot: Arc<SessionSlot>,
        auth: Arc<dyn AuthApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { slot, auth, store }
    }

    pub fn slot(&self) -> &Arc<SessionSlot> {
        &self.slot
    }

    pub fn current(&self) -> Arc<SessionSnapshot> {
        self.slot.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.current().phase == Phase::Loading
    }

    pub fn is_admin(&self) -> bool {
        self.current().is_admin()
    }

    /// Restore a persisted session, if any.
    ///
    /// A token the server no longer accepts is dropped quietly; only storage
    /// failures are reported.
    #[instrument(name = "card_portal.session.init", skip_all)]
    pub async fn init(&self) -> Result<(), ApiError> {
        let stored = match self.store.get(Self::TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                self.slot.store(SessionSnapshot::signed_out());
                return Err(e);
            }
        };

        let Some(token) = stored else {
            debug!("no stored token");
            self.slot.store(SessionSnapshot::signed_out());
            return Ok(());
        };

        // The gateway reads the token from the slot, so it goes in first.
        self.slot.store(SessionSnapshot {
            token: Some(token.clone()),
            identity: None,
            phase: Phase::Loading,
        });

        match self.auth.me().await {
            Ok(resp) => {
                info!(user_id = resp.user.id, role = %resp.user.role_name, "session restored");
                self.slot.store(SessionSnapshot {
                    token: Some(token),
                    identity: Some(resp.user),
                    phase: Phase::Ready,
                });
                Ok(())
            }
            Err(e) => {
                if e.is_unauthorized() {
                    info!("stored token rejected, signing out");
                } else {
                    info!(error = %e, "session restore failed, signing out");
                }
                self.slot.store(SessionSnapshot::signed_out());
                if let Err(remove_err) = self.store.remove(Self::TOKEN_KEY) {
                    warn!(error = %remove_err, "cannot remove stored token");
                }
                Ok(())
            }
        }
    }

    #[instrument(name = "card_portal.session.login", skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        credentials.validate()?;
        let resp = self.auth.login(credentials).await?;
        Ok(self.sign_in(resp))
    }

    #[instrument(name = "card_portal.session.register", skip_all, fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        credentials.validate()?;
        let resp = self.auth.register(credentials).await?;
        Ok(self.sign_in(resp))
    }

    pub fn logout(&self) {
        self.slot.store(SessionSnapshot::signed_out());
        if let Err(e) = self.store.remove(Self::TOKEN_KEY) {
            warn!(error = %e, "cannot remove stored token");
        }
        info!("signed out");
    }

    fn sign_in(&self, resp: AuthResponse) -> Identity {
        let AuthResponse { token, user } = resp;
        if let Err(e) = self.store.set(Self::TOKEN_KEY, &token) {
            warn!(error = %e, "cannot persist token, session lasts for this process only");
        }
        info!(user_id = user.id, role = %user.role_name, "signed in");
        self.slot.store(SessionSnapshot {
            token: Some(token),
            identity: Some(user.clone()),
            phase: Phase::Ready,
        });
        user
    }
}
