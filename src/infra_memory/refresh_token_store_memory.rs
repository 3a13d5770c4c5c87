use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Refresh tokens held in process memory.
///
/// Conditional operations run under the shard lock of the principal's key,
/// which gives the same per-key atomicity the Redis scripts provide.
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    records: DashMap<PrincipalKey, RefreshTokenRecord>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn save(&self, record: &RefreshTokenRecord) -> Result<(), AuthError> {
        self.records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn find_by_key(
        &self,
        key: &PrincipalKey,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete_if_value(&self, key: &PrincipalKey, expected: &str) -> Result<bool, AuthError> {
        Ok(self
            .records
            .remove_if(key, |_, record| record.value == expected)
            .is_some())
    }

    async fn replace_if_value(
        &self,
        expected: &str,
        record: &RefreshTokenRecord,
    ) -> Result<bool, AuthError> {
        match self.records.get_mut(&record.key) {
            Some(mut current) if current.value == expected => {
                *current = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
