//! Login, logout and the session probe

use std::sync::Arc;

use shared::{Identity, LoginRequest, LoginResponse, ProfileResponse};

use super::{SessionContext, SessionPhase, SessionState};
use crate::config::ApiGroup;
use crate::error::{ClientError, ClientResult, ErrorContext};
use crate::http::HttpClient;
use crate::mutation::ValidationErrors;

const LOGIN_PATH: &str = "/auth/login";
const PROFILE_PATH: &str = "/profile";

/// Session store driving the `anonymous → authenticating → authenticated`
/// lifecycle
pub struct SessionStore<C: HttpClient> {
    http: Arc<C>,
}

impl<C: HttpClient> Clone for SessionStore<C> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
        }
    }
}

impl<C: HttpClient> SessionStore<C> {
    pub fn new(http: Arc<C>) -> Self {
        Self { http }
    }

    pub fn context(&self) -> &SessionContext {
        self.http.session()
    }

    pub fn state(&self) -> SessionState {
        self.context().state()
    }

    /// Log in and probe the identity
    ///
    /// The session only becomes authenticated once `/profile` succeeds. Any
    /// failure leaves the store in the error phase with no token.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<Identity> {
        let ctx = self.context();
        ctx.set_state(SessionState::authenticating());

        match self.login_inner(credentials).await {
            Ok(identity) => {
                tracing::info!(role = %identity.role, user = %identity.display_name, "Logged in");
                ctx.set_state(SessionState::authenticated(identity.clone()));
                Ok(identity)
            }
            Err(e) => {
                ctx.clear_token();
                let message = e.user_message(ErrorContext::Login);
                tracing::warn!(error = %e, "Login failed");
                ctx.set_state(SessionState::error(message));
                Err(e)
            }
        }
    }

    async fn login_inner(&self, credentials: &LoginRequest) -> ClientResult<Identity> {
        let mut errors = ValidationErrors::default();
        if credentials.email.trim().is_empty() {
            errors.push("email", "Email is required");
        }
        if credentials.password.is_empty() {
            errors.push("password", "Password is required");
        }
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }

        let resp: LoginResponse = self
            .http
            .post(ApiGroup::Primary, LOGIN_PATH, credentials)
            .await?;
        if resp.token.is_empty() {
            return Err(ClientError::InvalidResponse("Missing token in login response".into()));
        }
        self.context().set_token(resp.token)?;

        self.probe().await
    }

    /// Session probe ("who am I")
    pub async fn fetch_current_user(&self) -> ClientResult<Identity> {
        let identity = self.probe().await?;
        self.context()
            .set_state(SessionState::authenticated(identity.clone()));
        Ok(identity)
    }

    async fn probe(&self) -> ClientResult<Identity> {
        let resp: ProfileResponse = self.http.get(ApiGroup::Primary, PROFILE_PATH, &[]).await?;
        Ok(Identity::from_profile(resp))
    }

    /// Resume a persisted session at start-up
    ///
    /// Returns `None` when there is no token or the probe fails; a failed
    /// probe drops the stale token.
    pub async fn restore(&self) -> Option<Identity> {
        let ctx = self.context();
        ctx.token()?;
        ctx.set_state(SessionState::authenticating());
        match self.fetch_current_user().await {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!(error = %e, "Stored session could not be restored");
                ctx.clear_token();
                ctx.set_state(SessionState::anonymous(None));
                None
            }
        }
    }

    /// Clear the token and return to anonymous; never fails
    pub fn logout(&self) {
        let ctx = self.context();
        ctx.clear_token();
        ctx.set_state(SessionState::anonymous(None));
        tracing::info!("Logged out");
    }

    /// Leave the error phase after the message has been shown
    pub fn acknowledge_error(&self) {
        let ctx = self.context();
        if ctx.state().phase == SessionPhase::Error {
            ctx.set_state(SessionState::anonymous(None));
        }
    }
}
