use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const COMPARE_DELETE: &str = include_str!("refresh_compare_delete.lua");
const COMPARE_REPLACE: &str = include_str!("refresh_compare_replace.lua");

/// Refresh tokens as JSON strings under `{prefix}:refresh:{principal}`.
///
/// Keys expire with the token, which only reclaims space: validity is still
/// decided by the token's own `exp`.
pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
    compare_delete: Script,
    compare_replace: Script,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
            compare_delete: Script::new(COMPARE_DELETE),
            compare_replace: Script::new(COMPARE_REPLACE),
        }
    }

    fn key(&self, principal: &PrincipalKey) -> String {
        format!("{}:refresh:{}", self.prefix, principal)
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let secs = (until - Utc::now()).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }

    fn encode(record: &RefreshTokenRecord) -> Result<String, AuthError> {
        serde_json::to_string(record).map_err(|e| AuthError::Store(e.to_string()))
    }

    fn interpret(status: i64, key: &str) -> Result<bool, AuthError> {
        match status {
            1 => Ok(true),
            0 | -1 => {
                debug!(key, status, "conditional refresh update skipped");
                Ok(false)
            }
            other => Err(AuthError::Store(format!("unknown script status {other}"))),
        }
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn save(&self, record: &RefreshTokenRecord) -> Result<(), AuthError> {
        let key = self.key(&record.key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, Self::encode(record)?, Self::ttl_secs(record.expires_at))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn find_by_key(
        &self,
        key: &PrincipalKey,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        raw.map(|s| serde_json::from_str(&s).map_err(|e| AuthError::Store(e.to_string())))
            .transpose()
    }

    async fn delete_if_value(&self, key: &PrincipalKey, expected: &str) -> Result<bool, AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let status: i64 = self
            .compare_delete
            .key(&key)
            .arg(expected)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Self::interpret(status, &key)
    }

    async fn replace_if_value(
        &self,
        expected: &str,
        record: &RefreshTokenRecord,
    ) -> Result<bool, AuthError> {
        let key = self.key(&record.key);
        let mut conn = self.conn.clone();
        let status: i64 = self
            .compare_replace
            .key(&key)
            .arg(expected)
            .arg(Self::encode(record)?)
            .arg(Self::ttl_secs(record.expires_at))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Self::interpret(status, &key)
    }
}
