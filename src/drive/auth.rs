//! Session acquisition for the Drive API.
//!
//! [`RefreshTokenAuthenticator`] exchanges a stored OAuth refresh token for a
//! fresh access token on every call, which is what the re-authentication
//! retry needs. [`StaticTokenAuthenticator`] hands out a pre-minted token.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::form_urlencoded;

use super::{Authenticator, DriveError, Session};
use crate::http_client::{HttpTimeouts, build_http_client};

/// Google OAuth 2.0 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// How to turn an OAuth client secrets file into usable credentials.
const AUTHORIZED_USER_SUGGESTION: &str = "expected an \"authorized_user\" JSON file with \
     client_id, client_secret and refresh_token; an OAuth client secrets file \
     (secrets/client_secrets.json) has no refresh token. Produce one with \
     `gcloud auth application-default login --client-id-file=secrets/client_secrets.json \
     --scopes=https://www.googleapis.com/auth/drive.readonly` and pass the written \
     application_default_credentials.json via --credentials, or set DRIVE_ACCESS_TOKEN";

const UNREADABLE_SUGGESTION: &str = "check the path given to --credentials and its permissions";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// OAuth client and refresh token ("authorized_user" credentials file).
#[derive(Clone, Deserialize)]
pub struct AuthorizedUserCredentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Token endpoint; defaults to Google's.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for AuthorizedUserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl AuthorizedUserCredentials {
    /// Reads credentials from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Credentials`] when the file is unreadable or
    /// lacks a required field. A client secrets file (top-level `installed`
    /// or `web` object) is called out by name.
    pub async fn load(path: &Path) -> Result<Self, DriveError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DriveError::credentials(path, e.to_string(), UNREADABLE_SUGGESTION))?;
        serde_json::from_str(&raw).map_err(|e| {
            let reason = if is_client_secrets(&raw) {
                "file is an OAuth client secrets file, not authorized_user credentials".to_string()
            } else {
                e.to_string()
            };
            DriveError::credentials(path, reason, AUTHORIZED_USER_SUGGESTION)
        })
    }
}

fn is_client_secrets(raw: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(raw).is_ok_and(|value| {
        value.get("installed").is_some_and(serde_json::Value::is_object)
            || value.get("web").is_some_and(serde_json::Value::is_object)
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Mints sessions by exchanging a refresh token at the token endpoint.
#[derive(Debug, Clone)]
pub struct RefreshTokenAuthenticator {
    client: Client,
    credentials: AuthorizedUserCredentials,
}

impl RefreshTokenAuthenticator {
    /// Creates an authenticator for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Client`] when the HTTP client cannot be built.
    pub fn new(credentials: AuthorizedUserCredentials) -> Result<Self, DriveError> {
        let client = build_http_client(HttpTimeouts::default())
            .map_err(|source| DriveError::Client { source })?;
        Ok(Self {
            client,
            credentials,
        })
    }
}

#[async_trait]
impl Authenticator for RefreshTokenAuthenticator {
    #[instrument(skip(self), fields(token_uri = %self.credentials.token_uri))]
    async fn authenticate(&self) -> Result<Session, DriveError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("client_id", &self.credentials.client_id)
            .append_pair("client_secret", &self.credentials.client_secret)
            .append_pair("refresh_token", &self.credentials.refresh_token)
            .finish();

        let token_uri = &self.credentials.token_uri;
        let response = self
            .client
            .post(token_uri.as_str())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| DriveError::network(token_uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::auth(format!(
                "token endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DriveError::invalid_response(token_uri, e.to_string()))?;
        if token.access_token.is_empty() {
            return Err(DriveError::auth("token endpoint returned an empty access token"));
        }

        info!("Authenticated with Google Drive");
        Ok(Session::new(token.access_token))
    }
}

/// Hands out the same pre-minted access token on every call.
#[derive(Clone)]
pub struct StaticTokenAuthenticator {
    token: String,
}

impl StaticTokenAuthenticator {
    /// Wraps an access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticTokenAuthenticator")
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self) -> Result<Session, DriveError> {
        if self.token.trim().is_empty() {
            return Err(DriveError::auth("access token is empty"));
        }
        debug!("using static access token");
        Ok(Session::new(self.token.trim()))
    }
}
