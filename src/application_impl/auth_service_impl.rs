use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of comparing a presented refresh token with the stored session.
#[derive(Debug)]
enum SessionCheck {
    Missing,
    Mismatched,
    Matched(RefreshTokenRecord),
}

impl SessionCheck {
    fn evaluate(stored: Option<RefreshTokenRecord>, presented: &RefreshToken) -> Self {
        match stored {
            None => SessionCheck::Missing,
            Some(record) if record.value != presented.0 => SessionCheck::Mismatched,
            Some(record) => SessionCheck::Matched(record),
        }
    }
}

/// A presented token pair that passed every check against the live session.
struct VerifiedSession {
    access: DecodedAccess,
    record: RefreshTokenRecord,
}

/// Login, logout, and refresh-token rotation on top of the token codec and
/// the session stores.
pub struct RealAuthService {
    member_repo: Arc<dyn MemberRepo>,
    tx_manager: Arc<dyn TxManager>,
    credential_hasher: Arc<dyn CredentialHasher>,
    authenticator: Arc<dyn CredentialAuthenticator>,
    token_codec: Arc<dyn TokenCodec>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    revocation_list: Arc<dyn RevocationList>,
}

impl RealAuthService {
    pub fn new(
        member_repo: Arc<dyn MemberRepo>,
        tx_manager: Arc<dyn TxManager>,
        credential_hasher: Arc<dyn CredentialHasher>,
        authenticator: Arc<dyn CredentialAuthenticator>,
        token_codec: Arc<dyn TokenCodec>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        revocation_list: Arc<dyn RevocationList>,
    ) -> Self {
        Self {
            member_repo,
            tx_manager,
            credential_hasher,
            authenticator,
            token_codec,
            refresh_store,
            revocation_list,
        }
    }

    fn validate_signup(email: &str, password: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::InvalidInput("email is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password is required".to_string()));
        }
        Ok(())
    }

    #[inline]
    fn new_member_id() -> MemberId {
        MemberId(Uuid::new_v4())
    }

    /// Shared prefix of logout and reissue. The refresh token is checked
    /// before anything is looked up, so a forged or expired one reveals
    /// nothing about whether a session exists.
    async fn verify_session(&self, request: &TokenRequest) -> Result<VerifiedSession, AuthError> {
        if !self.token_codec.is_valid(&request.refresh_token.0) {
            return Err(Unauthorized::RefreshTokenInvalid.into());
        }

        let access = self.token_codec.decode_access(&request.access_token)?;

        let stored = self
            .refresh_store
            .find_by_key(&access.principal.key)
            .await?;

        match SessionCheck::evaluate(stored, &request.refresh_token) {
            SessionCheck::Missing => Err(Unauthorized::NoSession.into()),
            SessionCheck::Mismatched => Err(Unauthorized::MismatchedToken.into()),
            SessionCheck::Matched(record) => Ok(VerifiedSession { access, record }),
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<MemberId, AuthError> {
        let SignupInput {
            email,
            password,
            name,
        } = request;

        Self::validate_signup(&email, &password)?;

        if self.member_repo.exists_by_email(&email).await? {
            return Err(AuthError::Conflict("member already exists".to_string()));
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let member_id = Self::new_member_id();

        let mut tx = self.tx_manager.begin().await?;
        let created = self
            .member_repo
            .create_in_tx(
                tx.as_mut(),
                NewMember {
                    member_id,
                    email: &email,
                    name: &name,
                    password_hash: &password_hash,
                    role: Role::User,
                },
            )
            .await;
        if let Err(e) = created {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "signup rollback failed");
            }
            return Err(e);
        }
        tx.commit().await?;

        info!(%member_id, %email, "member signed up");
        Ok(member_id)
    }

    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput { email, password } = request;

        let principal = match self.authenticator.authenticate(&email, &password).await {
            Ok(principal) => principal,
            Err(e) => {
                warn!(%email, error = %e, "login rejected");
                return Err(e);
            }
        };

        let pair = self.token_codec.issue(&principal)?;

        // Last writer wins: a new login replaces any earlier session.
        let record = RefreshTokenRecord::from_pair(principal.key.clone(), &pair);
        self.refresh_store.save(&record).await?;

        info!(principal = %principal.key, "login succeeded");
        Ok(pair)
    }

    async fn logout(&self, request: TokenRequest) -> Result<MessageResponse, AuthError> {
        let VerifiedSession { access, record } = self.verify_session(&request).await?;

        // Revocation comes first. If the delete below loses to a concurrent
        // reissue, the presented access token stays revoked while the rotated
        // session survives.
        self.revocation_list
            .append(&RevokedAccessTokenRecord {
                key: record.key.clone(),
                token_value: request.access_token.0.clone(),
                expires_at: access.expires_at,
            })
            .await?;

        let deleted = self
            .refresh_store
            .delete_if_value(&record.key, &record.value)
            .await?;
        if !deleted {
            // rotated by a concurrent reissue after the lookup
            warn!(principal = %record.key, "session changed during logout");
            return Err(Unauthorized::MismatchedToken.into());
        }

        info!(principal = %record.key, "logged out");
        Ok(MessageResponse::new("Logout"))
    }

    async fn reissue(&self, request: TokenRequest) -> Result<TokenPair, AuthError> {
        let VerifiedSession { access, record } = self.verify_session(&request).await?;

        // The presented access token stays usable until it expires; only
        // logout puts access tokens on the revocation list.
        let pair = self.token_codec.issue(&access.principal)?;
        let rotated = RefreshTokenRecord::from_pair(record.key.clone(), &pair);

        let replaced = self
            .refresh_store
            .replace_if_value(&record.value, &rotated)
            .await?;
        if !replaced {
            warn!(principal = %record.key, "session changed during reissue");
            return Err(Unauthorized::MismatchedToken.into());
        }

        info!(principal = %record.key, "tokens reissued");
        Ok(pair)
    }

    async fn authorize(&self, access_token: &AccessToken) -> Result<Principal, AuthError> {
        if !self.token_codec.is_valid(&access_token.0) {
            return Err(Unauthorized::TokenInvalid.into());
        }
        if let Some(revoked) = self.revocation_list.find(&access_token.0).await? {
            debug!(principal = %revoked.key, "revoked access token presented");
            return Err(Unauthorized::TokenRevoked.into());
        }
        self.token_codec.decode_principal(access_token)
    }
}
