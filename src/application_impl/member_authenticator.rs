use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::MemberRepo;
use std::sync::Arc;

/// Checks email/password pairs against stored members.
pub struct MemberCredentialAuthenticator {
    member_repo: Arc<dyn MemberRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl MemberCredentialAuthenticator {
    pub fn new(
        member_repo: Arc<dyn MemberRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            member_repo,
            credential_hasher,
        }
    }
}

#[async_trait::async_trait]
impl CredentialAuthenticator for MemberCredentialAuthenticator {
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError> {
        let rec = self
            .member_repo
            .find_by_email(identifier)
            .await?
            .ok_or(Unauthorized::BadCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(secret, &rec.password_hash)
            .await?;
        if !ok {
            return Err(Unauthorized::BadCredentials.into());
        }

        let authorities = [rec.role.authority()].into_iter().collect();
        Ok(Principal::new(rec.email, authorities))
    }
}
