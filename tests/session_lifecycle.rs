use std::sync::Arc;
use std::time::Duration;
use tokenkeep::application_impl::*;
use tokenkeep::application_port::*;
use tokenkeep::domain_model::*;
use tokenkeep::domain_port::*;
use tokenkeep::infra_memory::*;

const PASSWORD: &str = "correct horse battery staple";

struct Harness {
    auth_service: Arc<dyn AuthService>,
    codec: Arc<JwtHs512Codec>,
    refresh_store: Arc<MemoryRefreshTokenStore>,
}

fn harness() -> Harness {
    let member_repo: Arc<dyn MemberRepo> = Arc::new(MemoryMemberRepo::new());
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
    let authenticator = Arc::new(MemberCredentialAuthenticator::new(
        member_repo.clone(),
        hasher.clone(),
    ));
    let cfg = JwtConfig::new(
        vec![0x5a; MIN_SIGNING_KEY_LEN],
        DEFAULT_ACCESS_TTL,
        DEFAULT_REFRESH_TTL,
    )
    .unwrap();
    let codec = Arc::new(JwtHs512Codec::new(cfg));
    let refresh_store = Arc::new(MemoryRefreshTokenStore::new());

    let auth_service = Arc::new(RealAuthService::new(
        member_repo,
        Arc::new(MemoryTxManager),
        hasher,
        authenticator,
        codec.clone(),
        refresh_store.clone(),
        Arc::new(MemoryRevocationList::new()),
    ));

    Harness {
        auth_service,
        codec,
        refresh_store,
    }
}

async fn signup_and_login(h: &Harness, email: &str) -> TokenPair {
    h.auth_service
        .signup(SignupInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            name: "member".to_string(),
        })
        .await
        .unwrap();
    h.auth_service
        .login(LoginInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn reissue_rotates_and_old_refresh_token_is_dead() {
    let h = harness();
    let first = signup_and_login(&h, "rotate@example.com").await;

    let second = h
        .auth_service
        .reissue(TokenRequest::from(&first))
        .await
        .unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    let stored = h
        .refresh_store
        .find_by_key(&PrincipalKey::from("rotate@example.com"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.value, second.refresh_token.0);

    let err = h
        .auth_service
        .reissue(TokenRequest::from(&first))
        .await
        .unwrap_err();
    assert_eq!(err.unauthorized_reason(), Some(Unauthorized::MismatchedToken));
    assert_eq!(err.status_code(), 401);

    // the rotated pair keeps working
    h.auth_service
        .reissue(TokenRequest::from(&second))
        .await
        .unwrap();
}

#[tokio::test]
async fn logout_ends_the_session_and_revokes_the_access_token() {
    let h = harness();
    let pair = signup_and_login(&h, "leave@example.com").await;

    let principal = h.auth_service.authorize(&pair.access_token).await.unwrap();
    assert_eq!(principal.key.as_str(), "leave@example.com");
    assert!(principal.authorities.contains("ROLE_USER"));

    let response = h
        .auth_service
        .logout(TokenRequest::from(&pair))
        .await
        .unwrap();
    assert_eq!(response, MessageResponse::new("Logout"));
    assert!(h.refresh_store.is_empty());

    let err = h
        .auth_service
        .reissue(TokenRequest::from(&pair))
        .await
        .unwrap_err();
    assert_eq!(err.unauthorized_reason(), Some(Unauthorized::NoSession));

    let err = h
        .auth_service
        .authorize(&pair.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.unauthorized_reason(), Some(Unauthorized::TokenRevoked));
}

#[tokio::test]
async fn reissue_leaves_the_previous_access_token_usable() {
    let h = harness();
    let first = signup_and_login(&h, "keep@example.com").await;

    h.auth_service
        .reissue(TokenRequest::from(&first))
        .await
        .unwrap();

    let principal = h.auth_service.authorize(&first.access_token).await.unwrap();
    assert_eq!(principal.key.as_str(), "keep@example.com");
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let h = harness();
    signup_and_login(&h, "twice@example.com").await;

    let err = h
        .auth_service
        .signup(SignupInput {
            email: "twice@example.com".to_string(),
            password: "another".to_string(),
            name: "again".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict(_)));
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn wrong_password_and_unknown_member_look_the_same() {
    let h = harness();
    signup_and_login(&h, "known@example.com").await;

    let wrong_password = h
        .auth_service
        .login(LoginInput {
            email: "known@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    let unknown = h
        .auth_service
        .login(LoginInput {
            email: "ghost@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown.to_string());
    assert_eq!(
        unknown.unauthorized_reason(),
        Some(Unauthorized::BadCredentials)
    );
}

#[tokio::test]
async fn forged_refresh_token_is_rejected_before_session_lookup() {
    let h = harness();
    let pair = signup_and_login(&h, "forge@example.com").await;

    let mut request = TokenRequest::from(&pair);
    request.refresh_token = RefreshToken(format!("{}x", pair.refresh_token.0));

    let err = h.auth_service.reissue(request).await.unwrap_err();
    assert_eq!(
        err.unauthorized_reason(),
        Some(Unauthorized::RefreshTokenInvalid)
    );
    assert_eq!(h.refresh_store.len(), 1);
}

#[test]
fn issued_access_token_decodes_to_the_same_principal() {
    let h = harness();
    let principal = Principal::new(
        "props@example.com",
        ["ROLE_USER", "ROLE_ADMIN"].into_iter().collect(),
    );

    let pair = h.codec.issue(&principal).unwrap();
    let decoded = h.codec.decode_access(&pair.access_token).unwrap();

    assert_eq!(decoded.principal, principal);
    assert!(!decoded.expired);
    assert!(h.codec.is_valid(&pair.access_token.0));
    assert!(h.codec.is_valid(&pair.refresh_token.0));
    assert_eq!(
        pair.refresh_token_expires_at - pair.access_token_expires_at,
        chrono::Duration::from_std(DEFAULT_REFRESH_TTL - DEFAULT_ACCESS_TTL).unwrap()
    );
}

#[test]
fn tokens_from_another_key_are_not_valid() {
    let h = harness();
    let other = JwtHs512Codec::new(
        JwtConfig::new(vec![0x11; 64], Duration::from_secs(60), Duration::from_secs(120)).unwrap(),
    );
    let pair = other
        .issue(&Principal::new("x@example.com", ["ROLE_USER"].into_iter().collect()))
        .unwrap();

    assert!(!h.codec.is_valid(&pair.access_token.0));
    assert!(h.codec.decode_access(&pair.access_token).is_err());
}
