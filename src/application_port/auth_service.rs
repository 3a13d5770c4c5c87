use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum Unauthorized {
    #[error("invalid credentials")]
    BadCredentials,
    #[error("refresh token not valid")]
    RefreshTokenInvalid,
    #[error("no session")]
    NoSession,
    #[error("mismatched token")]
    MismatchedToken,
    #[error("token carries no authorities")]
    MissingAuthorities,
    #[error("token not valid")]
    TokenInvalid,
    #[error("token revoked")]
    TokenRevoked,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Unauthorized(#[from] Unauthorized),
    #[error("{0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// HTTP-like status code a transport layer reports for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Conflict(_) => 409,
            AuthError::Unauthorized(_) => 401,
            AuthError::NotFound(_) => 404,
            AuthError::InvalidInput(_) => 400,
            AuthError::Store(_) | AuthError::InternalError(_) => 500,
        }
    }

    pub fn unauthorized_reason(&self) -> Option<Unauthorized> {
        match self {
            AuthError::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Body of logout and reissue: the pair a client currently holds.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl From<&TokenPair> for TokenRequest {
    fn from(pair: &TokenPair) -> Self {
        TokenRequest {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

/// Claims recovered from an access token whose signature checked out.
#[derive(Debug, Clone)]
pub struct DecodedAccess {
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
}

pub trait TokenCodec: Send + Sync {
    fn issue(&self, principal: &Principal) -> Result<TokenPair, AuthError>;

    /// Verifies the signature and extracts the principal. Expiry is tolerated
    /// so callers can still see who an expired token belonged to.
    fn decode_access(&self, token: &AccessToken) -> Result<DecodedAccess, AuthError>;

    /// Signature and expiry check. Every failure collapses to `false`: an
    /// expired token and a forged one look the same to the caller.
    fn is_valid(&self, token: &str) -> bool;

    fn decode_principal(&self, token: &AccessToken) -> Result<Principal, AuthError> {
        self.decode_access(token).map(|decoded| decoded.principal)
    }
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialAuthenticator: Send + Sync {
    /// Fails with `Unauthorized(BadCredentials)` for an unknown identifier or
    /// a wrong secret alike.
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<MemberId, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
    async fn logout(&self, request: TokenRequest) -> Result<MessageResponse, AuthError>;
    async fn reissue(&self, request: TokenRequest) -> Result<TokenPair, AuthError>;
    async fn authorize(&self, access_token: &AccessToken) -> Result<Principal, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AuthError::Conflict("dup".into()).status_code(), 409);
        assert_eq!(AuthError::from(Unauthorized::NoSession).status_code(), 401);
        assert_eq!(AuthError::NotFound("member".into()).status_code(), 404);
        assert_eq!(AuthError::InvalidInput("email".into()).status_code(), 400);
        assert_eq!(AuthError::Store("down".into()).status_code(), 500);
    }

    #[test]
    fn unauthorized_message_is_the_reason() {
        let err = AuthError::from(Unauthorized::RefreshTokenInvalid);
        assert_eq!(err.to_string(), "refresh token not valid");
        assert_eq!(err.unauthorized_reason(), Some(Unauthorized::RefreshTokenInvalid));
        assert_eq!(AuthError::Conflict("x".into()).unauthorized_reason(), None);
    }
}
