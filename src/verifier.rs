//! Collaborator contracts the session manager depends on.
//!
//! Both collaborators communicate rejection through `ok: false` in their
//! outcome, never by returning `Err`. An `Err` always means a transport-level
//! fault (network down, malformed response) and leaves session state alone.

use anyhow::Result;
use async_trait::async_trait;

use crate::session::Principal;

/// What the credential verifier reports back for a login attempt.
#[derive(Debug, Clone, Default)]
pub struct VerifyOutcome {
    pub ok: bool,
    pub principal: Option<Principal>,
    /// Verifier-issued tokens, when the backend mints its own. Absent means
    /// the manager generates opaque tokens locally.
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl VerifyOutcome {
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn accepted(principal: Principal) -> Self {
        Self {
            ok: true,
            principal: Some(principal),
            access_token: None,
            refresh_token: None,
        }
    }
}

/// What the token rotator reports back for a rotation attempt.
#[derive(Debug, Clone, Default)]
pub struct RotateOutcome {
    pub ok: bool,
    pub access_token: Option<String>,
    /// A replacement refresh token. Absent means the current one stays valid.
    pub refresh_token: Option<String>,
}

impl RotateOutcome {
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn accepted() -> Self {
        Self {
            ok: true,
            access_token: None,
            refresh_token: None,
        }
    }
}

/// Checks a username/secret pair and returns the principal's profile.
///
/// Must be safe to call repeatedly with the same inputs.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, secret: &str) -> Result<VerifyOutcome>;
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRotator: Send + Sync {
    async fn rotate(&self, refresh_token: &str) -> Result<RotateOutcome>;
}
