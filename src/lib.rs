//! authkit - session and credential lifecycle management.
//!
//! This crate provides:
//! - `SessionManager`: single-session login, token rotation, lazy expiry,
//!   and restore-after-restart
//! - `CredentialVerifier` / `TokenRotator`: collaborator contracts for the
//!   backend that actually checks secrets and mints capabilities
//! - `SessionStore`: durable persistence surface, with file and in-memory
//!   implementations
//! - `RemoteAuthenticator`: JSON-over-HTTP adapter implementing both
//!   collaborator contracts
//! - registration/login input validation
//!
//! Tokens are opaque unique identifiers, not verifiable credentials; real
//! cryptographic authentication lives behind the collaborator contracts.

pub mod config;
pub mod error;
pub mod manager;
pub mod remote;
pub mod session;
pub mod store;
pub mod token;
pub mod validate;
pub mod verifier;

pub use config::AuthConfig;
pub use error::AuthError;
pub use manager::{LoginResponse, LogoutResponse, RefreshResponse, SessionManager};
pub use remote::RemoteAuthenticator;
pub use session::{Principal, Session};
pub use store::{FileStore, MemoryStore, SessionStore};
pub use validate::{validate_login, validate_registration, RegistrationData, ValidationErrors};
pub use verifier::{CredentialVerifier, RotateOutcome, TokenRotator, VerifyOutcome};
