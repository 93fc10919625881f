//! The session manager: owns the one session a process holds.
//!
//! Single-session model: at most one principal is authenticated per manager
//! instance, and a second login silently supersedes the first. Validity is
//! always computed lazily from `expires_at` - there are no timers and no
//! "expiring" state.
//!
//! # Concurrency
//!
//! `login` and `refresh_access_token` suspend while a collaborator is
//! awaited, so two such calls can interleave. An async operation lock
//! serializes each read -> collaborator -> write -> persist sequence, which
//! keeps a concurrent pair of refreshes from assembling a session out of two
//! generations. The session itself sits behind a plain `std::sync::Mutex`
//! that is never held across an await, so the synchronous operations
//! (`logout`, the accessors, `is_authenticated`, `needs_refresh`,
//! `restore_session`) stay non-suspending.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::session::{Principal, Session};
use crate::store::SessionStore;
use crate::token::generate_token;
use crate::validate::validate_login;
use crate::verifier::{CredentialVerifier, TokenRotator};

/// Returned by a successful `login`.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub principal: Principal,
    pub access_token: String,
    pub message: String,
}

/// Returned by a successful `logout`.
#[derive(Debug, Clone)]
pub struct LogoutResponse {
    pub message: String,
}

/// Returned by a successful `refresh_access_token`.
#[derive(Debug, Clone)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionManager {
    verifier: Arc<dyn CredentialVerifier>,
    rotator: Arc<dyn TokenRotator>,
    store: Arc<dyn SessionStore>,
    config: AuthConfig,
    /// The one owned session. Never held across an await.
    state: Mutex<Option<Session>>,
    /// Serializes the mutating async operations end to end.
    op_lock: tokio::sync::Mutex<()>,
}

impl SessionManager {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        rotator: Arc<dyn TokenRotator>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self::with_config(verifier, rotator, store, AuthConfig::default())
    }

    pub fn with_config(
        verifier: Arc<dyn CredentialVerifier>,
        rotator: Arc<dyn TokenRotator>,
        store: Arc<dyn SessionStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            verifier,
            rotator,
            store,
            config,
            state: Mutex::new(None),
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Authenticate a username/password pair and establish a session.
    ///
    /// Any prior session is replaced in full; its tokens become unusable for
    /// refresh because only the newest refresh token is retained. The new
    /// session is persisted before this returns.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        validate_login(username, password)?;

        let _guard = self.op_lock.lock().await;

        let outcome = self
            .verifier
            .verify(username, password)
            .await
            .map_err(AuthError::VerifierUnavailable)?;

        if !outcome.ok {
            debug!(username = %username, "credentials rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let principal = outcome
            .principal
            .unwrap_or_else(|| Principal::new(username, username, None));
        let access_token = outcome.access_token.unwrap_or_else(generate_token);
        let refresh_token = outcome.refresh_token.unwrap_or_else(generate_token);

        let session = Session {
            principal: principal.clone(),
            access_token: access_token.clone(),
            refresh_token,
            expires_at: Utc::now() + self.config.session_timeout(),
        };
        self.commit(session)?;

        info!(username = %principal.username, "login successful");
        Ok(LoginResponse {
            principal,
            access_token,
            message: "Login successful".to_string(),
        })
    }

    /// Tear down the current session, in memory and in the store.
    ///
    /// A second consecutive call fails with `NoActiveSession`.
    pub fn logout(&self) -> Result<LogoutResponse, AuthError> {
        let mut state = self.lock_state();
        let session = state.as_ref().ok_or(AuthError::NoActiveSession)?;
        // Display name captured before the session is gone.
        let display_name = session.principal.display_name.clone();
        // Persisted record goes first: if the clear fails, the in-memory
        // session is kept so memory and store never diverge.
        self.store.clear().map_err(AuthError::Storage)?;
        *state = None;
        drop(state);

        info!(user = %display_name, "logged out");
        Ok(LogoutResponse {
            message: format!("{display_name} logged out"),
        })
    }

    /// Rotate the access token through the token-rotator collaborator.
    ///
    /// A rejected rotation clears the whole session (fail closed - the
    /// caller must re-authenticate), while a transport fault leaves state
    /// untouched. On success the access token is replaced, the refresh token
    /// is kept or replaced per the rotator, and the expiry window restarts.
    pub async fn refresh_access_token(&self) -> Result<RefreshResponse, AuthError> {
        let _guard = self.op_lock.lock().await;

        // Refresh-token absence is checked before active-session absence.
        // With a fully-populated Session the two conditions coincide; the
        // ordering is a recorded convention, not load-bearing.
        let refresh_token = match self.lock_state().as_ref() {
            Some(session) => session.refresh_token.clone(),
            None => return Err(AuthError::NoRefreshToken),
        };

        let outcome = self
            .rotator
            .rotate(&refresh_token)
            .await
            .map_err(AuthError::RotatorUnavailable)?;

        if !outcome.ok {
            *self.lock_state() = None;
            if let Err(err) = self.store.clear() {
                warn!(error = %err, "failed to clear persisted session after rejected rotation");
            }
            warn!("refresh token rejected, session cleared");
            return Err(AuthError::TokenRefreshFailed);
        }

        let mut state = self.lock_state();
        let Some(session) = state.as_mut() else {
            // A logout raced the rotation; don't resurrect the session.
            return Err(AuthError::NoActiveSession);
        };

        let access_token = outcome
            .access_token
            .filter(|token| token != &session.access_token)
            .unwrap_or_else(generate_token);
        session.access_token = access_token.clone();
        if let Some(rotated) = outcome.refresh_token {
            session.refresh_token = rotated;
        }
        session.expires_at = Utc::now() + self.config.session_timeout();

        let snapshot = session.clone();
        self.store.save(&snapshot).map_err(AuthError::Storage)?;
        drop(state);

        debug!(username = %snapshot.principal.username, "access token rotated");
        Ok(RefreshResponse {
            access_token,
            expires_at: snapshot.expires_at,
        })
    }

    /// True iff a session is held and its expiry is strictly in the future.
    /// Side-effect-free: querying never clears an expired session.
    pub fn is_authenticated(&self) -> bool {
        self.lock_state()
            .as_ref()
            .map(|session| !session.is_expired())
            .unwrap_or(false)
    }

    /// Advisory: true when the session is inside the refresh window. Never
    /// triggers a refresh itself.
    pub fn needs_refresh(&self) -> bool {
        self.lock_state()
            .as_ref()
            .map(|session| session.needs_refresh(self.config.refresh_threshold()))
            .unwrap_or(false)
    }

    /// Load the persisted session record back into memory.
    ///
    /// Returns false without raising for an absent, corrupt, or expired
    /// record; corrupt and expired records are cleared from the store.
    pub fn restore_session(&self) -> bool {
        match self.store.load() {
            Err(err) => {
                warn!(error = %err, "corrupt session record, clearing");
                self.clear_store_best_effort();
                false
            }
            Ok(None) => false,
            Ok(Some(session)) if session.is_expired() => {
                info!("persisted session expired, clearing");
                self.clear_store_best_effort();
                false
            }
            Ok(Some(session)) => {
                info!(username = %session.principal.username, "session restored");
                *self.lock_state() = Some(session);
                true
            }
        }
    }

    pub fn current_user(&self) -> Option<Principal> {
        self.lock_state().as_ref().map(|s| s.principal.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.lock_state().as_ref().map(|s| s.access_token.clone())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.lock_state().as_ref().map(|s| s.expires_at)
    }

    /// Replace the in-memory session and persist it under the state lock so
    /// no observer sees the two out of sync.
    fn commit(&self, session: Session) -> Result<(), AuthError> {
        let mut state = self.lock_state();
        self.store.save(&session).map_err(AuthError::Storage)?;
        *state = Some(session);
        Ok(())
    }

    fn clear_store_best_effort(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear session record");
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.state.lock().expect("session state lock poisoned")
    }
}
