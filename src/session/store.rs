//! The session store: owner of the token and the signed-in profile.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --restore(no token)--> Anonymous
//! Uninitialized --restore(token)-----> Restoring --/auth/me ok---> Authenticated
//!                                                \--/auth/me err--> Anonymous
//! Anonymous     --login/register-----> Authenticated
//! Authenticated --logout / any 401---> Anonymous
//! ```
//!
//! # Races
//!
//! Login, register and restore are serialized by an async transition lock.
//! Logout and forced logout never wait: they bump the session epoch instead,
//! and a sign-in that observes a changed epoch when it is about to commit
//! discards its result. A 401 only ends the session if the credential that
//! received it is still the current one, so a late response from a previous
//! session cannot sign out a newer one.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use validator::Validate;

use crate::api::auth::{
    ChangeNameRequest, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    TokenResponse, CHANGE_NAME_PATH, CHANGE_PASSWORD_PATH, LOGIN_PATH, ME_PATH, REGISTER_PATH,
};
use crate::http::{ApiClient, ApiError, ApiRequest, Credential};
use crate::session::data::{Session, SessionPhase, UserProfile};
use crate::session::io::TokenStore;

/// Reason shown when login fails without a backend detail.
pub const LOGIN_FALLBACK: &str = "Login failed";

/// Reason shown when registration fails without a backend detail.
pub const REGISTER_FALLBACK: &str = "Registration failed";

/// Reason shown when a logout lands while a sign-in is in flight.
pub const SIGN_IN_SUPERSEDED: &str = "Sign-in was cancelled by a logout";

/// Failed login or registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct AuthFailure {
    /// Human-readable reason, suitable for display.
    pub reason: String,
    /// The underlying API error, when there was one.
    pub cause: Option<ApiError>,
}

impl AuthFailure {
    fn from_api(err: ApiError, fallback: &str) -> Self {
        Self {
            reason: err.detail_or(fallback),
            cause: Some(err),
        }
    }

    fn superseded() -> Self {
        Self {
            reason: SIGN_IN_SUPERSEDED.to_string(),
            cause: None,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    token: Option<Credential>,
    user: Option<UserProfile>,
    epoch: u64,
}

impl SessionState {
    fn snapshot(&self) -> Session {
        Session {
            token: self.token.clone(),
            user: self.user.clone(),
            loading: self.phase.is_loading(),
            phase: self.phase,
        }
    }

    fn reset(&mut self) {
        self.phase = SessionPhase::Anonymous;
        self.token = None;
        self.user = None;
        self.epoch += 1;
    }
}

/// Owns the current credential and profile and mediates every authenticated
/// request.
pub struct SessionStore {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
    transitions: Mutex<()>,
}

impl SessionStore {
    /// Create an uninitialized store. Call [`SessionStore::restore`] at boot.
    #[must_use]
    pub fn new(client: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            tokens,
            state: RwLock::new(SessionState::default()),
            transitions: Mutex::new(()),
        }
    }

    /// The underlying API client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// A cloned view of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.read().snapshot()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.read().phase
    }

    /// The signed-in profile, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.read().user.clone()
    }

    /// Signed in with a validated profile.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    /// Signed in as an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin()
    }

    /// Signed in as a trainer.
    #[must_use]
    pub fn is_trainer(&self) -> bool {
        self.snapshot().is_trainer()
    }

    fn current_credential(&self) -> Option<Credential> {
        self.state.read().token.clone()
    }

    /// Restore a persisted session at boot.
    ///
    /// Without a persisted token this settles on Anonymous and makes no
    /// network call. Otherwise the token is validated once against
    /// `/auth/me`; if that fails, the token is removed from storage.
    pub async fn restore(&self) -> SessionPhase {
        let _transition = self.transitions.lock().await;

        let persisted = self.tokens.load().unwrap_or_else(|e| {
            log::warn!("Could not read persisted token: {e}");
            None
        });

        let Some(token) = persisted else {
            log::debug!("No persisted token; starting anonymous");
            self.state.write().reset();
            return SessionPhase::Anonymous;
        };

        let credential = Credential::new(token);
        let epoch = {
            let mut state = self.state.write();
            state.phase = SessionPhase::Restoring;
            state.token = Some(credential.clone());
            state.user = None;
            state.epoch += 1;
            state.epoch
        };

        match self.fetch_profile(&credential).await {
            Ok(user) => {
                let mut state = self.state.write();
                if state.epoch == epoch {
                    log::info!("Restored session for {} ({})", user.email, user.role);
                    state.user = Some(user);
                    state.phase = SessionPhase::Authenticated;
                }
                state.phase
            }
            Err(err) => {
                log::info!("Persisted session is no longer valid: {err}");
                self.expire(Some(&credential));
                self.phase()
            }
        }
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, ApiError> {
        self.client
            .execute(ApiRequest::get(ME_PATH).with_credential(Some(credential.clone())))
            .await
    }

    /// Sign in with email and password.
    ///
    /// On success the token is persisted and the resolved profile is returned
    /// for role-based redirection.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] carrying the backend's reason, or
    /// [`LOGIN_FALLBACK`] when the backend gave none.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthFailure> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request
            .validate()
            .map_err(|e| AuthFailure::from_api(e.into(), LOGIN_FALLBACK))?;

        let _transition = self.transitions.lock().await;
        self.login_locked(&request).await
    }

    async fn login_locked(&self, request: &LoginRequest) -> Result<UserProfile, AuthFailure> {
        let epoch = self.state.read().epoch;

        let issued: TokenResponse = self
            .client
            .execute(
                ApiRequest::post(LOGIN_PATH)
                    .with_json(request)
                    .map_err(|e| AuthFailure::from_api(e, LOGIN_FALLBACK))?,
            )
            .await
            .map_err(|e| {
                log::info!("Login rejected for {}: {e}", request.email);
                AuthFailure::from_api(e, LOGIN_FALLBACK)
            })?;

        let credential = Credential::new(issued.access_token);
        let profile = self.fetch_profile(&credential).await.map_err(|err| {
            log::warn!("Token issued but profile lookup failed: {err}");
            AuthFailure::from_api(err, LOGIN_FALLBACK)
        })?;

        // Nothing is persisted or replaced until the new profile is known.
        let mut state = self.state.write();
        if state.epoch != epoch {
            log::info!("Discarding sign-in for {}: session changed meanwhile", request.email);
            return Err(AuthFailure::superseded());
        }
        if let Err(e) = self.tokens.save(credential.expose()) {
            log::warn!("Signed in, but the token could not be persisted: {e}");
        }
        state.phase = SessionPhase::Authenticated;
        state.token = Some(credential);
        state.user = Some(profile.clone());
        state.epoch += 1;
        log::info!("Signed in as {} ({})", profile.email, profile.role);
        Ok(profile)
    }

    /// Register a trainer account with a registration code, then sign in with
    /// the same credentials.
    ///
    /// # Errors
    ///
    /// A registration failure carries the backend's reason or
    /// [`REGISTER_FALLBACK`]. A failure of the automatic sign-in that follows
    /// carries the login failure reason.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        registration_code: &str,
    ) -> Result<UserProfile, AuthFailure> {
        let request = RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            name: name.trim().to_string(),
            registration_code: registration_code.trim().to_string(),
        };
        request
            .validate()
            .map_err(|e| AuthFailure::from_api(e.into(), REGISTER_FALLBACK))?;

        let _transition = self.transitions.lock().await;

        let created: UserProfile = self
            .client
            .execute(
                ApiRequest::post(REGISTER_PATH)
                    .with_json(&request)
                    .map_err(|e| AuthFailure::from_api(e, REGISTER_FALLBACK))?,
            )
            .await
            .map_err(|e| {
                log::info!("Registration rejected for {}: {e}", request.email);
                AuthFailure::from_api(e, REGISTER_FALLBACK)
            })?;
        log::info!("Registered {} ({}); signing in", created.email, created.role);

        self.login_locked(&LoginRequest {
            email: request.email,
            password: request.password,
        })
        .await
    }

    /// Sign out. Clears the persisted token, the profile and the credential.
    ///
    /// Calling this while already signed out is a no-op apart from the
    /// storage clear.
    pub fn logout(&self) {
        let mut state = self.state.write();
        state.reset();
        self.clear_persisted();
        log::debug!("Session cleared");
    }

    fn clear_persisted(&self) {
        if let Err(e) = self.tokens.clear() {
            log::warn!("Could not remove persisted token: {e}");
        }
    }

    /// Force a logout if `used` is still the session's credential.
    ///
    /// Returns whether the session was ended.
    fn expire(&self, used: Option<&Credential>) -> bool {
        let mut state = self.state.write();
        if state.token.as_ref() != used {
            log::debug!("Ignoring authorization failure from a superseded session");
            return false;
        }
        state.reset();
        self.clear_persisted();
        true
    }

    /// Re-fetch the profile with the current token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token. Any failure of
    /// the profile call treats the token as invalid and forces a logout.
    pub async fn fetch_user_info(&self) -> Result<UserProfile, ApiError> {
        let Some(credential) = self.current_credential() else {
            self.logout();
            return Err(ApiError::NotAuthenticated);
        };

        match self.fetch_profile(&credential).await {
            Ok(profile) => {
                let mut state = self.state.write();
                if state.token.as_ref() == Some(&credential) {
                    state.user = Some(profile.clone());
                    state.phase = SessionPhase::Authenticated;
                }
                Ok(profile)
            }
            Err(err) => {
                if self.expire(Some(&credential)) {
                    log::info!("Profile refresh failed, signed out: {err}");
                }
                Err(err)
            }
        }
    }

    /// Refresh the stored profile after it changed on the backend.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::fetch_user_info`].
    pub async fn update_user_info(&self) -> Result<UserProfile, ApiError> {
        self.fetch_user_info().await
    }

    /// Send a request with the current credential attached.
    ///
    /// Every response passes through here: a 401 ends the session that issued
    /// the request, whichever screen made the call.
    ///
    /// # Errors
    ///
    /// Whatever [`ApiClient::execute`] reports.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let credential = self.current_credential();
        let result = self
            .client
            .execute(request.with_credential(credential.clone()))
            .await;

        if let Err(err) = &result {
            if err.is_unauthorized() && self.expire(credential.as_ref()) {
                log::warn!("Session expired; signed out");
            }
        }
        result
    }

    /// Rename the signed-in account and refresh the profile.
    ///
    /// # Errors
    ///
    /// Validation failures, rejected updates, or a failed profile refresh.
    pub async fn change_name(&self, name: &str) -> Result<UserProfile, ApiError> {
        let request = ChangeNameRequest {
            name: name.trim().to_string(),
        };
        request.validate()?;
        let _: MessageResponse = self
            .send(ApiRequest::put(CHANGE_NAME_PATH).with_json(&request)?)
            .await?;
        self.update_user_info().await
    }

    /// Change the signed-in account's password.
    ///
    /// # Errors
    ///
    /// Validation failures or the backend's rejection (e.g. wrong current
    /// password).
    pub async fn change_password(&self, current: &str, new: &str) -> Result<MessageResponse, ApiError> {
        let request = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        request.validate()?;
        self.send(ApiRequest::put(CHANGE_PASSWORD_PATH).with_json(&request)?)
            .await
    }
}
