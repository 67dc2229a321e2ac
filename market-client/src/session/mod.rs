//! Session state shared by every screen
//!
//! [`SessionContext`] is the injected handle the HTTP adapter reads the
//! token from on every call and the route guards subscribe to. The token
//! is only written by login, logout and the 401 hook.

mod store;
mod token;

pub use store::SessionStore;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

use std::sync::{Arc, RwLock};

use shared::Identity;
use tokio::sync::watch;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    Error,
}

/// Observable session state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub user: Option<Identity>,
    pub phase: SessionPhase,
    pub is_loading: bool,
    pub is_error: bool,
    pub message: Option<String>,
}

impl SessionState {
    pub fn anonymous(message: Option<String>) -> Self {
        Self {
            message,
            ..Self::default()
        }
    }

    pub fn authenticating() -> Self {
        Self {
            phase: SessionPhase::Authenticating,
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn authenticated(user: Identity) -> Self {
        Self {
            user: Some(user),
            phase: SessionPhase::Authenticated,
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: SessionPhase::Error,
            is_error: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}

struct SessionInner {
    token: RwLock<Option<String>>,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<SessionState>,
}

/// Cloneable session handle
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("has_token", &self.token().is_some())
            .field("phase", &self.state().phase)
            .finish()
    }
}

impl SessionContext {
    /// Create a context, picking up any token already persisted
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = store.load();
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(SessionInner {
                token: RwLock::new(token),
                store,
                state,
            }),
        }
    }

    /// In-memory session, nothing persisted
    pub fn ephemeral() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Current token, read at call time
    pub fn token(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Store a fresh token in memory and in persistent storage
    pub fn set_token(&self, token: impl Into<String>) -> std::io::Result<()> {
        let token = token.into();
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
        self.inner.store.save(&token)
    }

    /// Drop the token without touching the observable state
    pub(crate) fn clear_token(&self) {
        *self.inner.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted token");
        }
    }

    /// Process-wide invalidation used by the 401 hook
    ///
    /// Clears the persisted token and moves every subscriber to anonymous,
    /// whichever screen issued the failing call.
    pub fn invalidate(&self) {
        self.clear_token();
        self.set_state(SessionState::anonymous(Some("Session expired".to_string())));
        tracing::info!("Session invalidated");
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub(crate) fn set_state(&self, state: SessionState) {
        self.inner.state.send_replace(state);
    }
}
