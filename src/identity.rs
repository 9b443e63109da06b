// SPDX-License-Identifier: MIT

//! Chat-backend identity sync.
//!
//! Mirrors a user's display identity (id, name, avatar) into the external
//! chat service so conversations show current names and pictures. The sync
//! is best-effort at signup and mandatory at onboarding; the caller decides
//! how to treat a failure.

use std::{env, time::Duration};

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Display identity pushed to the chat backend.
#[derive(Debug, Serialize)]
pub struct IdentityProfile<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub image: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity sync configuration missing: {0}")]
    MissingConfig(String),

    #[error("identity sync request failed: {0}")]
    Request(String),

    #[error("identity sync rejected: {0}")]
    Rejected(String),
}

/// Client for the chat backend's user-upsert endpoint.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl IdentityClient {
    pub fn is_configured() -> bool {
        required_env_present("CHAT_API_URL") && required_env_present("CHAT_API_KEY")
    }

    pub fn from_env() -> Result<Self, IdentityError> {
        let base_url = env_required("CHAT_API_URL")?;
        let api_key = env_required("CHAT_API_KEY")?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key,
            http,
        })
    }

    /// Upsert a user's display identity. Only success/failure is consumed;
    /// the response body is ignored.
    pub async fn upsert(&self, profile: &IdentityProfile<'_>) -> Result<(), IdentityError> {
        let url = format!("{}/users", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(profile)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected(format!("{status}: {body}")));
        }

        debug!(user_id = profile.id, "chat identity upserted");
        Ok(())
    }
}

fn required_env_present(name: &str) -> bool {
    env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false)
}

fn env_required(name: &str) -> Result<String, IdentityError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| IdentityError::MissingConfig(name.to_string()))
}
