use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, ProfileUpdate, Role, User},
    error::{is_unique_violation, AppError, AppResult},
};

const USER_COLUMNS: &str = "id, username, email, full_name, gender, role, state, city, \
                            password_hash, refresh_token, created_at, updated_at";

/// Persistence for user accounts and their single live refresh token.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a new user; duplicate username or email fails with a conflict.
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
    /// `username` must already be lowercased.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_username_or_email(&self, username: &str, email: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    /// Overwrite only the fields present in `update`.
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
    /// Set or clear the stored refresh token.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()>;
    /// Replace the stored refresh token only if it still equals `expected`.
    /// Returns false when another request rotated or cleared it first.
    async fn rotate_refresh_token(&self, id: Uuid, expected: &str, next: &str) -> AppResult<bool>;
    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>>;
    async fn list_by_role_in(&self, role: Role, city: &str, state: &str) -> AppResult<Vec<User>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, gender, role, state, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.gender)
        .bind(user.role)
        .bind(&user.state)
        .bind(&user.city)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Duplicate("User already exists".into())
            } else {
                AppError::from(e)
            }
        })?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_username_or_email(&self, username: &str, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $2 LIMIT 1"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email      = COALESCE($2, email),
                   full_name  = COALESCE($3, full_name),
                   state      = COALESCE($4, state),
                   city       = COALESCE($5, city),
                   updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.email.as_deref())
        .bind(update.full_name.as_deref())
        .bind(update.state.as_deref())
        .bind(update.city.as_deref())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn rotate_refresh_token(&self, id: Uuid, expected: &str, next: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET refresh_token = $3 WHERE id = $1 AND refresh_token = $2")
            .bind(id)
            .bind(expected)
            .bind(next)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY username"
        ))
        .bind(role)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_by_role_in(&self, role: Role, city: &str, state: &str) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
              FROM users
             WHERE role = $1 AND city = $2 AND state = $3
             ORDER BY username
            "#
        ))
        .bind(role)
        .bind(city)
        .bind(state)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
