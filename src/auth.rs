//! Bearer token acquisition.
//!
//! The tracker only needs an opaque access token. `ClientCredentials` runs the
//! OAuth2 client-credentials grant against the directory authority;
//! `StaticToken` passes through a token issued elsewhere.

use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::{Error, Result};

/// Source of a bearer token for the remote API.
pub trait TokenProvider {
    fn access_token(&self) -> Result<String>;
}

/// A token supplied by the caller.
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String> {
        let token = self.0.trim();
        if token.is_empty() {
            return Err(Error::Auth("empty bearer token".into()));
        }
        Ok(token.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth2 client-credentials grant against `{authority}/{tenant}/oauth2/v2.0/token`.
pub struct ClientCredentials {
    client: reqwest::blocking::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl ClientCredentials {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            token_url: token_url(&config.api.authority_url, &config.tenant_id),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.api.scope.clone(),
        })
    }
}

/// Token endpoint for a tenant.
pub fn token_url(authority_url: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_url.trim_end_matches('/'),
        tenant_id
    )
}

impl TokenProvider for ClientCredentials {
    fn access_token(&self) -> Result<String> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
            ("grant_type", "client_credentials"),
        ];
        tracing::debug!(url = %self.token_url, "requesting access token");
        let resp = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .map_err(|e| Error::Auth(format!("token request failed: {}", e)))?;

        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        parse_token_response(status.as_u16(), &body)
    }
}

/// Extract the access token from a token endpoint response.
fn parse_token_response(status: u16, body: &str) -> Result<String> {
    let parsed: Option<TokenResponse> = serde_json::from_str(body).ok();
    if !(200..300).contains(&status) {
        let detail = parsed
            .and_then(|p| p.error_description)
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(Error::Auth(detail));
    }
    parsed
        .and_then(|p| p.access_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Auth("no access_token in response".into()))
}
