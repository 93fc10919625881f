//! Session lifecycle configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Access token lifetime in seconds (1 hour).
const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 3600;

/// Buffer time before expiry to advise a refresh (5 minutes).
const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How long an access token is valid after issue.
    pub session_timeout_secs: i64,
    /// How close to expiry `needs_refresh` starts reporting true.
    pub refresh_threshold_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS,
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
        }
    }
}

impl AuthConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::seconds(self.session_timeout_secs)
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::seconds(self.refresh_threshold_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_documented_windows() {
        let config = AuthConfig::default();
        assert_eq!(config.session_timeout(), Duration::hours(1));
        assert_eq!(config.refresh_threshold(), Duration::minutes(5));
    }
}
