//! User row accessors.

use sqlx::PgExecutor;

use super::error::{StoreError, classify};
use super::models::User;

pub struct NewUser<'a> {
    pub username: &'a str,
    pub hashed_password: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn create<'e>(exec: impl PgExecutor<'e>, user: NewUser<'_>) -> Result<User, StoreError> {
        sqlx::query_as(
            r#"INSERT INTO users (username, hashed_password, full_name, email)
               VALUES ($1, $2, $3, $4)
               RETURNING username, hashed_password, full_name, email, password_changed_at, created_at"#,
        )
        .bind(user.username)
        .bind(user.hashed_password)
        .bind(user.full_name)
        .bind(user.email)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    /// Get user by username. `NotFound` if absent.
    pub async fn get<'e>(exec: impl PgExecutor<'e>, username: &str) -> Result<User, StoreError> {
        sqlx::query_as(
            r#"SELECT username, hashed_password, full_name, email, password_changed_at, created_at
               FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    /// Fetch a batch of users by exact usernames.
    pub async fn get_many<'e>(
        exec: impl PgExecutor<'e>,
        usernames: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, StoreError> {
        sqlx::query_as(
            r#"SELECT username, hashed_password, full_name, email, password_changed_at, created_at
               FROM users WHERE username = ANY($1)
               ORDER BY username LIMIT $2 OFFSET $3"#,
        )
        .bind(usernames)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    /// Case-insensitive substring search on username.
    pub async fn search<'e>(
        exec: impl PgExecutor<'e>,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, StoreError> {
        sqlx::query_as(
            r#"SELECT username, hashed_password, full_name, email, password_changed_at, created_at
               FROM users WHERE username ILIKE '%' || $1 || '%'
               ORDER BY username LIMIT $2 OFFSET $3"#,
        )
        .bind(query)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    pub async fn update_password<'e>(
        exec: impl PgExecutor<'e>,
        username: &str,
        hashed_password: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE users SET hashed_password = $2, password_changed_at = now()
               WHERE username = $1"#,
        )
        .bind(username)
        .bind(hashed_password)
        .execute(exec)
        .await
        .map_err(classify)?;
        Ok(())
    }

    pub async fn delete<'e>(exec: impl PgExecutor<'e>, username: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(exec)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
