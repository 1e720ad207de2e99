//! OAuth client-credentials setup phase. The token is fetched once per
//! run and shared read-only with every virtual user; refresh and
//! revalidation are explicitly out of scope.

use std::time::Duration;

use serde::Deserialize;

use crate::config::OauthConfig;
use crate::errors::RunError;

/// JSON body of a successful token response. Only `access_token` is
/// consumed; the rest is tolerated.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

pub struct TokenClient {
    client: reqwest::Client,
    token_url: String,
}

impl TokenClient {
    pub fn new(token_url: impl Into<String>, timeout_ms: u64) -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| RunError::Other {
                detail: format!("failed to build http client: {e}"),
            })?;
        Ok(Self {
            client,
            token_url: token_url.into(),
        })
    }

    /// Fetches a bearer token with the client-credentials grant.
    /// An empty `access_token` is treated as a failed fetch; handing
    /// workers an empty bearer would fail 2000 iterations later with a
    /// far worse message.
    pub async fn fetch_token(&self, oauth: &OauthConfig) -> Result<String, RunError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("scope", oauth.scope.as_str()),
        ];
        tracing::debug!(token_url = %self.token_url, "fetching access token");
        let resp = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| RunError::from_transport(&e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RunError::from_token_status(
                status.as_u16(),
                truncate(&body, 200),
            ));
        }
        let token: TokenResponse =
            resp.json()
                .await
                .map_err(|e| RunError::TokenFetch {
                    status: status.as_u16(),
                    detail: format!("malformed token response: {e}"),
                })?;
        ensure_non_empty(token, status.as_u16())
    }
}

fn ensure_non_empty(token: TokenResponse, status: u16) -> Result<String, RunError> {
    if token.access_token.trim().is_empty() {
        return Err(RunError::TokenFetch {
            status,
            detail: "token response carried an empty access_token".into(),
        });
    }
    Ok(token.access_token)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}
