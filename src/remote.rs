//! HTTP-backed implementations of the collaborator contracts.
//!
//! `RemoteAuthenticator` fronts a JSON-over-HTTP auth backend and implements
//! both `CredentialVerifier` and `TokenRotator`. Rejection travels in-band
//! (`ok: false` in the response body); anything transport-shaped - network
//! failure, non-success status, unparseable body - surfaces as `Err` and the
//! session manager maps it to the matching `*Unavailable` error.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::Principal;
use crate::verifier::{CredentialVerifier, RotateOutcome, TokenRotator, VerifyOutcome};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProfile {
    id: String,
    username: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    ok: bool,
    principal: Option<WireProfile>,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RotateResponse {
    ok: bool,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Remote auth backend adapter.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RemoteAuthenticator {
    client: Client,
    base_url: String,
}

impl RemoteAuthenticator {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("auth backend returned status {status}");
        }
        Ok(response)
    }
}

#[async_trait]
impl CredentialVerifier for RemoteAuthenticator {
    async fn verify(&self, username: &str, secret: &str) -> Result<VerifyOutcome> {
        let url = format!("{}/api/login", self.base_url);
        debug!(%url, %username, "verifying credentials");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest {
                username,
                password: secret,
            })
            .send()
            .await
            .context("Failed to send login request")?;
        let response = Self::check_response(response).await?;

        let body: VerifyResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        Ok(VerifyOutcome {
            ok: body.ok,
            principal: body.principal.map(|p| Principal::new(p.id, p.username, p.display_name)),
            access_token: body.access_token,
            refresh_token: body.refresh_token,
        })
    }
}

#[async_trait]
impl TokenRotator for RemoteAuthenticator {
    async fn rotate(&self, refresh_token: &str) -> Result<RotateOutcome> {
        let url = format!("{}/api/refresh", self.base_url);
        debug!(%url, "rotating access token");

        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .context("Failed to send refresh request")?;
        let response = Self::check_response(response).await?;

        let body: RotateResponse = response
            .json()
            .await
            .context("Failed to parse refresh response")?;

        Ok(RotateOutcome {
            ok: body.ok,
            access_token: body.access_token,
            refresh_token: body.refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let remote = RemoteAuthenticator::new("https://auth.example.com/").unwrap();
        assert_eq!(remote.base_url, "https://auth.example.com");
    }

    #[test]
    fn test_verify_response_parses_camel_case_wire_format() {
        let body = r#"{
            "ok": true,
            "principal": {"id": "u-1", "username": "testuser", "displayName": "Test User"},
            "accessToken": "abc123",
            "refreshToken": "def456"
        }"#;
        let parsed: VerifyResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.ok);
        assert_eq!(parsed.principal.unwrap().display_name.as_deref(), Some("Test User"));
        assert_eq!(parsed.access_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_rotate_response_tolerates_missing_tokens() {
        let parsed: RotateResponse = serde_json::from_str(r#"{"ok": false}"#).unwrap();
        assert!(!parsed.ok);
        assert!(parsed.access_token.is_none());
        assert!(parsed.refresh_token.is_none());
    }
}
