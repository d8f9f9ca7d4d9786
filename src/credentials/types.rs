//! Credential types
//!
//! Wire and storage representation of the session credential pair.

use serde::{Deserialize, Serialize};

/// An access/refresh token pair
///
/// This is both the wire shape returned by the auth endpoints (camelCase
/// fields) and the shape persisted by the file store. The pair is indivisible:
/// a store never holds one half without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived credential attached to API requests
    pub access_token: String,
    /// Longer-lived credential used solely to obtain a new access token
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new token pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}
