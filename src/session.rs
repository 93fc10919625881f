//! Session data model: the principal plus its token pair and expiry.
//!
//! A `Session` only exists fully populated. Absence of a session is modeled
//! as `Option<Session>` at the manager level, so there is no representable
//! "half logged in" state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated identity a session represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub display_name: String,
}

impl Principal {
    /// Build a principal from verifier profile attributes, deriving the
    /// display name from the username when the profile carries none.
    pub fn new(id: impl Into<String>, username: impl Into<String>, display_name: Option<String>) -> Self {
        let username = username.into();
        let display_name = display_name.unwrap_or_else(|| username.clone());
        Self {
            id: id.into(),
            username,
            display_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub principal: Principal,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is live only while `expires_at` is strictly in the future.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the session will expire within `threshold` and should be
    /// refreshed. Advisory only.
    pub fn needs_refresh(&self, threshold: Duration) -> bool {
        Utc::now() > self.expires_at - threshold
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Get seconds remaining until expiry (for display)
    pub fn seconds_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_seconds().max(0)
    }
}
