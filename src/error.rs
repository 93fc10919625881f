use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Input failed local precondition checks. Never persisted, never sent
    /// to a collaborator.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Authentication rejected. One fixed message: callers must not learn
    /// whether the username or the password was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No active session")]
    NoActiveSession,

    #[error("No refresh token available")]
    NoRefreshToken,

    /// The rotator rejected the refresh token. The session has been cleared
    /// as a side effect; the caller must re-authenticate.
    #[error("Token refresh failed - please log in again")]
    TokenRefreshFailed,

    /// Transport-level fault talking to the credential verifier. No state
    /// change.
    #[error("Credential verifier unavailable: {0}")]
    VerifierUnavailable(#[source] anyhow::Error),

    /// Transport-level fault talking to the token rotator. No state change.
    #[error("Token rotator unavailable: {0}")]
    RotatorUnavailable(#[source] anyhow::Error),

    #[error("Session storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
