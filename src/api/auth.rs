//! Authentication operations
//!
//! Login and registration persist the returned token pair through the
//! client's credential store; logout posts the refresh token for revocation
//! and clears the store even when that request fails.

use super::users::User;
use crate::credentials::TokenPair;
use crate::error::{Error, Result};
use crate::http::{ApiClient, RequestConfig};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Login payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

/// Registration payload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Response from the login/register endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Freshly issued access token
    pub access_token: String,
    /// Freshly issued refresh token
    pub refresh_token: String,
    /// The authenticated account
    pub user: User,
}

impl AuthResponse {
    fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.access_token.clone(), self.refresh_token.clone())
    }
}

/// Claims carried by the access token
///
/// Decoded client-side for display purposes only; the server remains the
/// authority on whether the token is actually valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Account id
    pub user_id: String,
    /// Account email
    pub email: String,
    /// Account role
    pub role: String,
    /// Expiry timestamp (seconds since epoch)
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at timestamp (seconds since epoch)
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Authentication endpoints
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Create the auth API over a client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and persist the issued token pair
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .client
            .post("/auth/login", serde_json::to_value(credentials)?)
            .await?;
        self.client.set_tokens(response.token_pair()).await?;
        Ok(response)
    }

    /// Register a new account and persist the issued token pair
    pub async fn register(&self, data: &RegisterRequest) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .client
            .post("/auth/register", serde_json::to_value(data)?)
            .await?;
        self.client.set_tokens(response.token_pair()).await?;
        Ok(response)
    }

    /// Revoke the current refresh token and clear stored credentials
    ///
    /// The store is cleared even when the revocation request fails; the
    /// request error is still surfaced afterwards.
    pub async fn logout(&self) -> Result<()> {
        let refresh = self.client.store().refresh_token().await?;
        let result = match refresh {
            Some(token) => self
                .client
                .request(
                    Method::POST,
                    "/auth/logout",
                    RequestConfig::new().json(json!({ "refreshToken": token })),
                )
                .await
                .map(|_| ()),
            None => Ok(()),
        };
        self.client.clear_tokens().await?;
        result
    }

    /// Revoke every session for this account, then clear stored credentials
    pub async fn logout_all(&self) -> Result<()> {
        let result = self
            .client
            .request(Method::POST, "/auth/logout-all", RequestConfig::new())
            .await
            .map(|_| ());
        self.client.clear_tokens().await?;
        result
    }

    /// Claims of the stored access token, if one is present and well-formed
    ///
    /// A malformed token yields `None` rather than an error, matching the
    /// "treat as logged out" behavior callers want for display state.
    pub async fn current_user(&self) -> Result<Option<AccessClaims>> {
        let Some(token) = self.client.store().access_token().await? else {
            return Ok(None);
        };

        match decode_claims(&token) {
            Ok(claims) => Ok(Some(claims)),
            Err(err) => {
                debug!(%err, "stored access token is not decodable");
                Ok(None)
            }
        }
    }

    /// Whether a decodable access token is currently stored
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.current_user().await?.is_some())
    }
}

/// Decode access-token claims without verifying the signature
fn decode_claims(token: &str) -> Result<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| Error::Other(format!("failed to decode access token: {e}")))?;
    Ok(data.claims)
}
