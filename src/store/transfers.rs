//! Transfer row accessors.

use sqlx::PgExecutor;

use super::error::{StoreError, classify};
use super::models::Transfer;

pub struct TransferRepository;

impl TransferRepository {
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        from_account_id: i64,
        to_account_id: i64,
        amount: i64,
    ) -> Result<Transfer, StoreError> {
        sqlx::query_as(
            r#"INSERT INTO transfers (from_account_id, to_account_id, amount)
               VALUES ($1, $2, $3)
               RETURNING id, from_account_id, to_account_id, amount, created_at"#,
        )
        .bind(from_account_id)
        .bind(to_account_id)
        .bind(amount)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    pub async fn get<'e>(exec: impl PgExecutor<'e>, id: i64) -> Result<Transfer, StoreError> {
        sqlx::query_as(
            r#"SELECT id, from_account_id, to_account_id, amount, created_at
               FROM transfers WHERE id = $1"#,
        )
        .bind(id)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    pub async fn list<'e>(
        exec: impl PgExecutor<'e>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, from_account_id, to_account_id, amount, created_at
               FROM transfers ORDER BY id LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    pub async fn list_by_from_account<'e>(
        exec: impl PgExecutor<'e>,
        from_account_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, from_account_id, to_account_id, amount, created_at
               FROM transfers WHERE from_account_id = $1
               ORDER BY id LIMIT $2 OFFSET $3"#,
        )
        .bind(from_account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    pub async fn list_by_to_account<'e>(
        exec: impl PgExecutor<'e>,
        to_account_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, from_account_id, to_account_id, amount, created_at
               FROM transfers WHERE to_account_id = $1
               ORDER BY id LIMIT $2 OFFSET $3"#,
        )
        .bind(to_account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    /// Administrative correction, exercised only by row-store tests.
    pub async fn update_amount<'e>(
        exec: impl PgExecutor<'e>,
        id: i64,
        amount: i64,
    ) -> Result<Transfer, StoreError> {
        sqlx::query_as(
            r#"UPDATE transfers SET amount = $2 WHERE id = $1
               RETURNING id, from_account_id, to_account_id, amount, created_at"#,
        )
        .bind(id)
        .bind(amount)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    /// Search transfers touching any account whose owner matches the query,
    /// on either side of the movement.
    pub async fn search_by_account_owner<'e>(
        exec: impl PgExecutor<'e>,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, StoreError> {
        sqlx::query_as(
            r#"SELECT t.id, t.from_account_id, t.to_account_id, t.amount, t.created_at
               FROM transfers t
               JOIN accounts fa ON fa.id = t.from_account_id
               JOIN accounts ta ON ta.id = t.to_account_id
               WHERE fa.owner ILIKE '%' || $1 || '%'
                  OR ta.owner ILIKE '%' || $1 || '%'
               ORDER BY t.id LIMIT $2 OFFSET $3"#,
        )
        .bind(query)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    pub async fn delete<'e>(exec: impl PgExecutor<'e>, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM transfers WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
