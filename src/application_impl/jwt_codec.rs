use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SubsecRound, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(60 * 60); // 60 minutes
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7 days

/// HS512 wants a key at least as long as its digest.
pub const MIN_SIGNING_KEY_LEN: usize = 64;

#[derive(Clone)]
pub struct JwtConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    signing_key: Vec<u8>,
}

impl JwtConfig {
    pub fn new(
        signing_key: Vec<u8>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, AuthError> {
        if signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(AuthError::InvalidInput(format!(
                "signing key must be at least {} bytes, got {}",
                MIN_SIGNING_KEY_LEN,
                signing_key.len()
            )));
        }
        if access_ttl.as_secs() == 0 || refresh_ttl.as_secs() == 0 {
            return Err(AuthError::InvalidInput(
                "token lifetimes must be at least one second".to_string(),
            ));
        }
        Ok(JwtConfig {
            access_ttl,
            refresh_ttl,
            signing_key,
        })
    }

    pub fn from_base64_secret(
        secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, AuthError> {
        let key = STANDARD
            .decode(secret.trim())
            .map_err(|e| AuthError::InvalidInput(format!("signing secret is not base64: {e}")))?;
        Self::new(key, access_ttl, refresh_ttl)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth: Option<String>, // comma-joined authorities
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    exp: i64,
    jti: String, // keeps rotated values distinct within one second
}

pub struct JwtHs512Codec {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtHs512Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&cfg.signing_key);
        let decoding_key = DecodingKey::from_secret(&cfg.signing_key);
        JwtHs512Codec {
            cfg,
            encoding_key,
            decoding_key,
        }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn validation(validate_exp: bool) -> Validation {
        let mut v = Validation::new(Algorithm::HS512);
        v.leeway = 0;
        v.validate_exp = validate_exp;
        v.validate_aud = false;
        v
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS512), claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }
}

impl TokenCodec for JwtHs512Codec {
    fn issue(&self, principal: &Principal) -> Result<TokenPair, AuthError> {
        if let Some(bad) = principal.authorities.find_unencodable() {
            return Err(AuthError::InvalidInput(format!(
                "authority cannot be carried in a token: {bad:?}"
            )));
        }

        let issued_at = Utc::now().trunc_subsecs(0);
        let access_exp = issued_at + self.cfg.access_ttl;
        let refresh_exp = issued_at + self.cfg.refresh_ttl;

        let access_token = self.sign(&AccessClaims {
            sub: Some(principal.key.0.clone()),
            auth: Some(principal.authorities.to_claim()),
            exp: access_exp.timestamp(),
            jti: Some(Self::gen_jti()),
        })?;
        let refresh_token = self.sign(&RefreshClaims {
            exp: refresh_exp.timestamp(),
            jti: Self::gen_jti(),
        })?;

        Ok(TokenPair {
            grant_type: GrantType::Bearer,
            access_token: AccessToken(access_token),
            access_token_expires_at: access_exp,
            refresh_token: RefreshToken(refresh_token),
            refresh_token_expires_at: refresh_exp,
        })
    }

    fn decode_access(&self, token: &AccessToken) -> Result<DecodedAccess, AuthError> {
        let (data, expired) =
            match decode::<AccessClaims>(&token.0, &self.decoding_key, &Self::validation(true)) {
                Ok(data) => (data, false),
                Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                    let data = decode::<AccessClaims>(
                        &token.0,
                        &self.decoding_key,
                        &Self::validation(false),
                    )
                    .map_err(|_| Unauthorized::TokenInvalid)?;
                    (data, true)
                }
                Err(e) => {
                    debug!(error = %e, "access token rejected");
                    return Err(Unauthorized::TokenInvalid.into());
                }
            };

        let claims = data.claims;
        let auth = claims.auth.ok_or(Unauthorized::MissingAuthorities)?;
        let sub = claims.sub.ok_or(Unauthorized::TokenInvalid)?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(Unauthorized::TokenInvalid)?;

        Ok(DecodedAccess {
            principal: Principal::new(sub, Authorities::from_claim(&auth)),
            expires_at,
            expired,
        })
    }

    fn is_valid(&self, token: &str) -> bool {
        match decode::<serde_json::Value>(token, &self.decoding_key, &Self::validation(true)) {
            Ok(_) => true,
            Err(e) => {
                debug!(kind = ?e.kind(), "token failed validation");
                false
            }
        }
    }
}
