use crate::application_port::*;
use crate::domain_model::*;

/// Append-only deny-list of access tokens.
#[async_trait::async_trait]
pub trait RevocationList: Send + Sync {
    async fn append(&self, record: &RevokedAccessTokenRecord) -> Result<(), AuthError>;

    async fn find(&self, token_value: &str) -> Result<Option<RevokedAccessTokenRecord>, AuthError>;
}
