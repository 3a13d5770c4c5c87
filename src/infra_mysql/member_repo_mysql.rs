use super::util::{downcast, is_dup_key};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

/// Members in the `member` table:
/// `member_id BINARY(16)`, `email` (unique), `name`, `password_hash`, `role`, `created_at`.
pub struct MySqlMemberRepo {
    pool: MySqlPool,
}

impl MySqlMemberRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlMemberRepo { pool }
    }

    #[inline]
    fn id_from_bytes(id: &[u8]) -> Result<MemberId, AuthError> {
        Ok(MemberId(
            Uuid::from_slice(id).map_err(|e| AuthError::Store(e.to_string()))?,
        ))
    }

    fn row_to_record(row: MySqlRow) -> Result<MemberRecord, AuthError> {
        let store_err = |e: sqlx::Error| AuthError::Store(e.to_string());

        let member_id_bytes: Vec<u8> = row.try_get("member_id").map_err(store_err)?;
        let role: String = row.try_get("role").map_err(store_err)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(store_err)?;

        Ok(MemberRecord {
            member_id: Self::id_from_bytes(&member_id_bytes)?,
            email: row.try_get("email").map_err(store_err)?,
            name: row.try_get("name").map_err(store_err)?,
            password_hash: row.try_get("password_hash").map_err(store_err)?,
            role: role
                .parse::<Role>()
                .map_err(|e| AuthError::Store(e.to_string()))?,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl MemberRepo for MySqlMemberRepo {
    async fn create_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        member: NewMember<'_>,
    ) -> Result<(), AuthError> {
        let tx = downcast(tx);

        sqlx::query(
            r#"
INSERT INTO member (member_id, email, name, password_hash, role)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(member.member_id.0.as_bytes() as &[u8])
        .bind(member.email)
        .bind(member.name)
        .bind(member.password_hash)
        .bind(member.role.as_str())
        .execute(tx.conn())
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::Conflict("member already exists".to_string())
            } else {
                AuthError::Store(e.to_string())
            }
        })?;

        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM member WHERE email = ?"#)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(count > 0)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT member_id, email, name, password_hash, role, created_at
FROM member
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("query member: {e}")))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
