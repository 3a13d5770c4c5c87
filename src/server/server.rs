use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Signing config from the base64 secret in `JWT_SECRET`, or from
/// `fallback_secret` when the variable is unset.
pub fn jwt_config_from_env(
    fallback_secret: &str,
    access_ttl: Duration,
    refresh_ttl: Duration,
) -> Result<JwtConfig, AuthError> {
    jwt_config_from(
        std::env::var(JWT_SECRET_ENV).ok(),
        fallback_secret,
        access_ttl,
        refresh_ttl,
    )
}

fn jwt_config_from(
    secret_override: Option<String>,
    fallback_secret: &str,
    access_ttl: Duration,
    refresh_ttl: Duration,
) -> Result<JwtConfig, AuthError> {
    let secret = secret_override.as_deref().unwrap_or(fallback_secret);
    JwtConfig::from_base64_secret(secret, access_ttl, refresh_ttl)
}

/// Service graph assembled from settings. The signing key is decoded once
/// here and handed to the codec; nothing else holds it.
pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pool: Option<Pool<MySql>>,
    ephemeral: bool,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let jwt_config = jwt_config_from_env(
            &settings.auth.secret,
            settings.auth.access_ttl(),
            settings.auth.refresh_ttl(),
        )?;
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs512Codec::new(jwt_config));

        let (refresh_store, revocation_list): (Arc<dyn RefreshTokenStore>, Arc<dyn RevocationList>) =
            match settings.store.backend.as_str() {
                "memory" => (
                    Arc::new(MemoryRefreshTokenStore::new()),
                    Arc::new(MemoryRevocationList::new()),
                ),
                "redis" => {
                    let dsn = settings
                        .store
                        .redis_dsn
                        .as_deref()
                        .ok_or_else(|| anyhow!("store.redis_dsn is required for the redis backend"))?;
                    let redis_client = redis::Client::open(dsn)?;
                    let redis_manager = redis_client.get_connection_manager().await?;
                    (
                        Arc::new(RedisRefreshTokenStore::new(
                            redis_manager.clone(),
                            &settings.store.prefix,
                        )),
                        Arc::new(RedisRevocationList::new(
                            redis_manager,
                            &settings.store.prefix,
                        )),
                    )
                }
                other => return Err(anyhow!("Unknown store backend: {}", other)),
            };

        let (member_repo, tx_manager, pool): (Arc<dyn MemberRepo>, Arc<dyn TxManager>, _) =
            match settings.member.backend.as_str() {
                "memory" => (
                    Arc::new(MemoryMemberRepo::new()),
                    Arc::new(MemoryTxManager),
                    None,
                ),
                "mysql" => {
                    let dsn = settings
                        .member
                        .mysql_dsn
                        .as_deref()
                        .ok_or_else(|| anyhow!("member.mysql_dsn is required for the mysql backend"))?;
                    let pool = Pool::<MySql>::connect(dsn).await?;
                    (
                        Arc::new(MySqlMemberRepo::new(pool.clone())),
                        Arc::new(MySqlTxManager::new(pool.clone())),
                        Some(pool),
                    )
                }
                other => return Err(anyhow!("Unknown member backend: {}", other)),
            };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let authenticator: Arc<dyn CredentialAuthenticator> = Arc::new(
            MemberCredentialAuthenticator::new(member_repo.clone(), credential_hasher.clone()),
        );

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            member_repo,
            tx_manager,
            credential_hasher,
            authenticator,
            token_codec,
            refresh_store,
            revocation_list,
        ));

        let ephemeral = settings.store.backend == "memory" || settings.member.backend == "memory";

        info!(
            store = %settings.store.backend,
            member = %settings.member.backend,
            ephemeral,
            "server started"
        );

        Ok(Self {
            auth_service,
            pool,
            ephemeral,
        })
    }

    /// True when members or sessions live only in this process and vanish
    /// with it.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings;

    #[tokio::test]
    async fn dev_settings_build_a_working_service() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        let server = Server::try_new(&settings).await.unwrap();

        server
            .auth_service
            .signup(SignupInput {
                email: "boot@x.com".to_string(),
                password: "pw".to_string(),
                name: "boot".to_string(),
            })
            .await
            .unwrap();
        let pair = server
            .auth_service
            .login(LoginInput {
                email: "boot@x.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert!(server.auth_service.authorize(&pair.access_token).await.is_ok());
        assert!(server.is_ephemeral());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn each_server_starts_with_empty_memory_backends() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        let first = Server::try_new(&settings).await.unwrap();
        first
            .auth_service
            .signup(SignupInput {
                email: "once@x.com".to_string(),
                password: "pw".to_string(),
                name: "once".to_string(),
            })
            .await
            .unwrap();

        let second = Server::try_new(&settings).await.unwrap();
        assert!(second.is_ephemeral());
        let err = second
            .auth_service
            .login(LoginInput {
                email: "once@x.com".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.unauthorized_reason(), Some(Unauthorized::BadCredentials));
    }

    #[test]
    fn secret_override_is_base64_like_the_settings_secret() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        let (access, refresh) = (settings.auth.access_ttl(), settings.auth.refresh_ttl());

        assert!(jwt_config_from(None, &settings.auth.secret, access, refresh).is_ok());
        assert!(jwt_config_from(None, "", access, refresh).is_err());

        let overridden = jwt_config_from(
            Some(settings.auth.secret.clone()),
            "not base64 at all",
            access,
            refresh,
        );
        assert!(overridden.is_ok());

        // a raw-byte key is refused even when long enough
        let raw = "raw-signing-key!".repeat(6);
        let err = jwt_config_from(Some(raw), &settings.auth.secret, access, refresh).unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.store.backend = "etcd".to_string();
        assert!(Server::try_new(&settings).await.is_err());
    }
}
