//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{AccessId, PairId};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::domain::entity::{
    token::TokenRecord,
    user::{NewUser, User},
};
use crate::domain::repository::{RefreshRotation, TokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, token_kind::TokenKind, user_id::UserId, user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

}

const USER_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    user_role,
    confirmed,
    confirmation_digest,
    last_login_at,
    created_at,
    updated_at
"#;

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (
                email,
                password_hash,
                user_role,
                confirmed,
                confirmation_digest
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.user_role.id())
        .bind(user.confirmed)
        .bind(user.confirmation_digest.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
            _ => AuthError::from(e),
        })?;

        row.into_user()
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_by_confirmation_digest(&self, digest: &str) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE confirmation_digest = $1"
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn confirm(&self, user_id: UserId) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                confirmed = TRUE,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.value())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn update_last_login(&self, user_id: UserId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(user_id.value())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password: &UserPassword) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.value())
        .bind(password.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Token Repository Implementation
// ============================================================================

impl TokenRepository for PgAuthRepository {
    async fn insert(&self, record: &TokenRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (
                token_id,
                token_kind,
                pair_id,
                user_id,
                created_at,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.token_id)
        .bind(record.kind.as_str())
        .bind(record.pair_id.into_uuid())
        .bind(record.owner.value())
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_pair(&self, access: &TokenRecord, refresh: &TokenRecord) -> AuthResult<()> {
        insert_pair_with(&self.pool, access, refresh).await
    }

    async fn delete_pair(&self, access_id: AccessId, pair_id: PairId) -> AuthResult<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM auth_tokens
            WHERE (token_id = $1 AND token_kind = 'ACCESS')
               OR (pair_id = $2 AND token_kind = 'REFRESH')
            "#,
        )
        .bind(access_id.into_uuid())
        .bind(pair_id.into_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }

    async fn find_owner_by_id_and_kind(
        &self,
        token_id: Uuid,
        kind: TokenKind,
    ) -> AuthResult<Option<UserId>> {
        let owner = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT user_id
            FROM auth_tokens
            WHERE token_id = $1 AND token_kind = $2
            "#,
        )
        .bind(token_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner.map(UserId::new))
    }

    async fn rotate_refresh(&self, rotation: &RefreshRotation) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        // A concurrent rotation of the same record blocks on the row lock
        // here and then sees zero rows
        let consumed = sqlx::query(
            r#"
            DELETE FROM auth_tokens
            WHERE token_id = $1 AND token_kind = 'REFRESH' AND user_id = $2
            "#,
        )
        .bind(rotation.consumed.into_uuid())
        .bind(rotation.owner.value())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if consumed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(pair_id) = rotation.revoke_access_of {
            sqlx::query("DELETE FROM auth_tokens WHERE pair_id = $1 AND token_kind = 'ACCESS'")
                .bind(pair_id.into_uuid())
                .execute(&mut *tx)
                .await?;
        }

        insert_pair_with(&mut *tx, &rotation.access, &rotation.refresh).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn delete_all_for_user(&self, owner: UserId, except: Option<PairId>) -> AuthResult<u64> {
        let deleted = match except {
            Some(pair_id) => {
                sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1 AND pair_id != $2")
                    .bind(owner.value())
                    .bind(pair_id.into_uuid())
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
            None => sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
                .bind(owner.value())
                .execute(&self.pool)
                .await?
                .rows_affected(),
        };

        Ok(deleted)
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

/// Both records in one statement, so the pair is written whole or not at all
async fn insert_pair_with<'e, E>(
    executor: E,
    access: &TokenRecord,
    refresh: &TokenRecord,
) -> AuthResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO auth_tokens (
            token_id,
            token_kind,
            pair_id,
            user_id,
            created_at,
            expires_at
        ) VALUES
            ($1, $2, $3, $4, $5, $6),
            ($7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(access.token_id)
    .bind(access.kind.as_str())
    .bind(access.pair_id.into_uuid())
    .bind(access.owner.value())
    .bind(access.created_at)
    .bind(access.expires_at)
    .bind(refresh.token_id)
    .bind(refresh.kind.as_str())
    .bind(refresh.pair_id.into_uuid())
    .bind(refresh.owner.value())
    .bind(refresh.created_at)
    .bind(refresh.expires_at)
    .execute(executor)
    .await?;

    Ok(())
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    user_role: i16,
    confirmed: bool,
    confirmation_digest: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let user_role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user_role: {}", self.user_role)))?;

        Ok(User {
            user_id: UserId::new(self.id),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_db(self.password_hash),
            user_role,
            confirmed: self.confirmed,
            confirmation_digest: self.confirmation_digest,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
