use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryRevocationList {
    revoked: DashMap<String, RevokedAccessTokenRecord>,
}

impl MemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

#[async_trait::async_trait]
impl RevocationList for MemoryRevocationList {
    async fn append(&self, record: &RevokedAccessTokenRecord) -> Result<(), AuthError> {
        // first write wins, entries are never rewritten
        self.revoked
            .entry(record.token_value.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn find(&self, token_value: &str) -> Result<Option<RevokedAccessTokenRecord>, AuthError> {
        Ok(self.revoked.get(token_value).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn appended_tokens_are_found_and_never_rewritten() {
        let list = MemoryRevocationList::new();
        let first = RevokedAccessTokenRecord {
            key: "a@x.com".into(),
            token_value: "tok".to_string(),
            expires_at: Utc::now(),
        };
        list.append(&first).await.unwrap();
        list.append(&RevokedAccessTokenRecord {
            expires_at: first.expires_at + Duration::hours(1),
            ..first.clone()
        })
        .await
        .unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.find("tok").await.unwrap(), Some(first));
        assert_eq!(list.find("other").await.unwrap(), None);
    }
}
