use crate::application_port::*;
use crate::domain_model::*;

/// One live refresh token per principal, keyed by principal.
///
/// Mutations that depend on the stored value go through the conditional
/// operations, which must compare and write atomically per key.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Upsert: replaces whatever record the principal had.
    async fn save(&self, record: &RefreshTokenRecord) -> Result<(), AuthError>;

    async fn find_by_key(&self, key: &PrincipalKey)
    -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Deletes the record only while it still holds `expected`.
    async fn delete_if_value(&self, key: &PrincipalKey, expected: &str)
    -> Result<bool, AuthError>;

    /// Overwrites the record for `record.key` only while it still holds `expected`.
    async fn replace_if_value(
        &self,
        expected: &str,
        record: &RefreshTokenRecord,
    ) -> Result<bool, AuthError>;
}
