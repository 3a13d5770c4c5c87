//! Walks one member through signup, login, rotation, and logout against the
//! in-memory stores, printing each step.
//!
//! $ cargo run --bin session_demo

use std::sync::Arc;
use tokenkeep::application_impl::*;
use tokenkeep::application_port::*;
use tokenkeep::domain_port::*;
use tokenkeep::infra_memory::*;
use tokenkeep::logger::*;
use tokenkeep::server::jwt_config_from_env;

/// Base64 dev key, overridden by `JWT_SECRET` as in the server.
const DEV_SECRET: &str = "ZGV2LW9ubHktc2lnbmluZy1rZXktZGV2LW9ubHktc2lnbmluZy1rZXktZGV2LW9ubHktc2lnbmluZy1rZXktZGV2LW9ubHktc2lnbmluZy1rZXkt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    logger.reload_from_config(&LogConfig {
        filter: "info,tokenkeep=debug".to_string(),
    })?;

    let member_repo: Arc<dyn MemberRepo> = Arc::new(MemoryMemberRepo::new());
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
    let authenticator: Arc<dyn CredentialAuthenticator> = Arc::new(
        MemberCredentialAuthenticator::new(member_repo.clone(), hasher.clone()),
    );
    let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs512Codec::new(jwt_config_from_env(
        DEV_SECRET,
        DEFAULT_ACCESS_TTL,
        DEFAULT_REFRESH_TTL,
    )?));

    let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
        member_repo,
        Arc::new(MemoryTxManager),
        hasher,
        authenticator,
        token_codec,
        Arc::new(MemoryRefreshTokenStore::new()),
        Arc::new(MemoryRevocationList::new()),
    ));

    let member_id = auth_service
        .signup(SignupInput {
            email: "demo@example.com".to_string(),
            password: "demo-password".to_string(),
            name: "demo".to_string(),
        })
        .await?;
    println!("signup -> {}", member_id);

    let duplicate = auth_service
        .signup(SignupInput {
            email: "demo@example.com".to_string(),
            password: "other".to_string(),
            name: "again".to_string(),
        })
        .await;
    if let Err(e) = duplicate {
        println!("signup again -> {} {}", e.status_code(), e);
    }

    let pair = auth_service
        .login(LoginInput {
            email: "demo@example.com".to_string(),
            password: "demo-password".to_string(),
        })
        .await?;
    println!("login -> {}", serde_json::to_string_pretty(&pair)?);

    let principal = auth_service.authorize(&pair.access_token).await?;
    println!("authorize -> {} {:?}", principal.key, principal.authorities);

    let rotated = auth_service.reissue(TokenRequest::from(&pair)).await?;
    println!("reissue -> {}", serde_json::to_string_pretty(&rotated)?);

    if let Err(e) = auth_service.reissue(TokenRequest::from(&pair)).await {
        println!("reissue with the old pair -> {} {}", e.status_code(), e);
    }

    let bye = auth_service.logout(TokenRequest::from(&rotated)).await?;
    println!("logout -> {}", bye.message);

    if let Err(e) = auth_service.authorize(&rotated.access_token).await {
        println!("authorize after logout -> {} {}", e.status_code(), e);
    }
    if let Err(e) = auth_service.reissue(TokenRequest::from(&rotated)).await {
        println!("reissue after logout -> {} {}", e.status_code(), e);
    }

    Ok(())
}
