use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::repo_tx::StorageTx;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct MemberRecord {
    pub member_id: MemberId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMember<'a> {
    pub member_id: MemberId,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

#[async_trait::async_trait]
pub trait MemberRepo: Send + Sync {
    /// Fails with `Conflict` when the email is already taken.
    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        member: NewMember<'_>,
    ) -> Result<(), AuthError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, AuthError>;
}
