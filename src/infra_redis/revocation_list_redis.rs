use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};

/// Revoked access tokens under `{prefix}:revoked:{sha256(token)}`.
///
/// Entries carry no TTL; the deny-list is append-only.
pub struct RedisRevocationList {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRevocationList {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRevocationList {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, token_value: &str) -> String {
        format!("{}:revoked:{}", self.prefix, token_digest(token_value))
    }
}

fn token_digest(token_value: &str) -> String {
    hex::encode(Sha256::digest(token_value.as_bytes()))
}

#[async_trait::async_trait]
impl RevocationList for RedisRevocationList {
    async fn append(&self, record: &RevokedAccessTokenRecord) -> Result<(), AuthError> {
        let value = serde_json::to_string(record).map_err(|e| AuthError::Store(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: bool = conn
            .set_nx(self.key(&record.token_value), value)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn find(&self, token_value: &str) -> Result<Option<RevokedAccessTokenRecord>, AuthError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.key(token_value))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        raw.map(|s| serde_json::from_str(&s).map_err(|e| AuthError::Store(e.to_string())))
            .transpose()
    }
}
