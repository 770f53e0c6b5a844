//! Database repository for users.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::UserId;
use chrono::NaiveDateTime;
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Also return soft-deleted rows
    pub include_inactive: bool,
}

impl UserFilter {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self { include_inactive: true }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub in_use: bool,
    pub inserted_at: NaiveDateTime,
    pub inserted_by: Option<UserId>,
    pub updated_at: Option<NaiveDateTime>,
    pub updated_by: Option<UserId>,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            in_use: user.in_use,
            inserted_at: user.inserted_at,
            inserted_by: user.inserted_by,
            updated_at: user.updated_at,
            updated_by: user.updated_by,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, inserted_by)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.password_hash)
        .bind(request.inserted_by)
        .fetch_one(&mut *self.db)
        .await
        .map_err(|e| DbError::from(e).for_username(&request.username))?;

        Ok(UserDBResponse::from(user))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND in_use = 1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(include_inactive = filter.include_inactive), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE (? OR in_use = 1) ORDER BY username ASC")
            .bind(filter.include_inactive)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(UserDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id, actor: UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                in_use = 0,
                updated_at = CURRENT_TIMESTAMP,
                updated_by = ?
            WHERE id = ? AND in_use = 1
            "#,
        )
        .bind(actor)
        .bind(id)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // A missing hash keeps the stored one
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = ?,
                password_hash = COALESCE(?, password_hash),
                updated_at = CURRENT_TIMESTAMP,
                updated_by = ?
            WHERE id = ? AND in_use = 1
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(request.password_hash.as_deref())
        .bind(request.updated_by)
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await
        .map_err(|e| DbError::from(e).for_username(&request.username))?
        .ok_or(DbError::NotFound)?;

        Ok(UserDBResponse::from(user))
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Look up an active user by exact username. Used by login.
    #[instrument(skip(self), err)]
    pub async fn get_user_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? AND in_use = 1 LIMIT 1")
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user.map(UserDBResponse::from))
    }

    /// Replace the stored hash without touching any other field. Used when re-seeding the
    /// administrator at startup, where there is no acting user.
    #[instrument(skip(self, password_hash), err)]
    pub async fn set_password_hash(&mut self, id: UserId, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? AND in_use = 1")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
