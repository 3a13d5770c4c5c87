use crate::application_port::*;
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Members keyed by email. Writes land immediately; the transaction handle
/// is accepted for signature compatibility only.
#[derive(Default)]
pub struct MemoryMemberRepo {
    members: DashMap<String, MemberRecord>,
}

impl MemoryMemberRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MemberRepo for MemoryMemberRepo {
    async fn create_in_tx<'t>(
        &self,
        _tx: &mut dyn StorageTx<'t>,
        member: NewMember<'_>,
    ) -> Result<(), AuthError> {
        match self.members.entry(member.email.to_string()) {
            Entry::Occupied(_) => Err(AuthError::Conflict("member already exists".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(MemberRecord {
                    member_id: member.member_id,
                    email: member.email.to_string(),
                    name: member.name.to_string(),
                    password_hash: member.password_hash.to_string(),
                    role: member.role,
                    created_at: Utc::now(),
                });
                Ok(())
            }
        }
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.members.contains_key(email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, AuthError> {
        Ok(self.members.get(email).map(|entry| entry.value().clone()))
    }
}
