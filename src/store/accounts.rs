//! Account row accessors.
//!
//! `add_balance` is the only balance mutation the transfer engine uses;
//! `set_balance` exists for administrative correction and row-store tests.

use sqlx::PgExecutor;

use super::error::{StoreError, classify};
use super::models::Account;

pub struct AccountRepository;

impl AccountRepository {
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        owner: &str,
        currency: &str,
        balance: i64,
    ) -> Result<Account, StoreError> {
        sqlx::query_as(
            r#"INSERT INTO accounts (owner, currency, balance)
               VALUES ($1, $2, $3)
               RETURNING id, owner, balance, currency, created_at"#,
        )
        .bind(owner)
        .bind(currency)
        .bind(balance)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    pub async fn get<'e>(exec: impl PgExecutor<'e>, id: i64) -> Result<Account, StoreError> {
        sqlx::query_as(
            "SELECT id, owner, balance, currency, created_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    pub async fn list_by_owner<'e>(
        exec: impl PgExecutor<'e>,
        owner: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, owner, balance, currency, created_at FROM accounts
               WHERE owner = $1 ORDER BY id LIMIT $2 OFFSET $3"#,
        )
        .bind(owner)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    /// Unpaged variant for the cascading user delete, which must see every
    /// owned account.
    pub async fn list_all_by_owner<'e>(
        exec: impl PgExecutor<'e>,
        owner: &str,
    ) -> Result<Vec<Account>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, owner, balance, currency, created_at FROM accounts
               WHERE owner = $1 ORDER BY id"#,
        )
        .bind(owner)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    /// Apply a signed delta to the balance and return the updated row.
    /// Locks the account row for the rest of the enclosing transaction.
    pub async fn add_balance<'e>(
        exec: impl PgExecutor<'e>,
        id: i64,
        delta: i64,
    ) -> Result<Account, StoreError> {
        sqlx::query_as(
            r#"UPDATE accounts SET balance = balance + $1
               WHERE id = $2
               RETURNING id, owner, balance, currency, created_at"#,
        )
        .bind(delta)
        .bind(id)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    pub async fn set_balance<'e>(
        exec: impl PgExecutor<'e>,
        id: i64,
        balance: i64,
    ) -> Result<Account, StoreError> {
        sqlx::query_as(
            r#"UPDATE accounts SET balance = $1
               WHERE id = $2
               RETURNING id, owner, balance, currency, created_at"#,
        )
        .bind(balance)
        .bind(id)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    /// Case-insensitive substring search on owner username.
    pub async fn search_by_owner<'e>(
        exec: impl PgExecutor<'e>,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, owner, balance, currency, created_at FROM accounts
               WHERE owner ILIKE '%' || $1 || '%'
               ORDER BY id LIMIT $2 OFFSET $3"#,
        )
        .bind(query)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    pub async fn delete<'e>(exec: impl PgExecutor<'e>, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
