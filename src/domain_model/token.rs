use super::PrincipalKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantType {
    Bearer,
}

/// Access/refresh pair handed to a client after login or reissue.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub grant_type: GrantType,
    pub access_token: AccessToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: RefreshToken,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// The single live refresh token of a principal.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub key: PrincipalKey,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn from_pair(key: PrincipalKey, pair: &TokenPair) -> Self {
        RefreshTokenRecord {
            key,
            value: pair.refresh_token.0.clone(),
            expires_at: pair.refresh_token_expires_at,
        }
    }
}

/// Deny-list entry for an access token revoked before its natural expiry.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RevokedAccessTokenRecord {
    pub key: PrincipalKey,
    pub token_value: String,
    pub expires_at: DateTime<Utc>,
}
