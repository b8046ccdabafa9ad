//! Entry row accessors.
//!
//! Entries are append-only ledger lines; `update_amount` is an
//! administrative accessor exercised only by low-level tests, never by the
//! transfer path.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use super::error::{StoreError, classify};
use super::models::Entry;

/// Whitelisted sort column for entry search. Caller input is parsed into
/// this enum; raw strings never reach the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySort {
    Id,
    Amount,
    CreatedAt,
}

impl EntrySort {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(EntrySort::Id),
            "amount" => Some(EntrySort::Amount),
            "created_at" => Some(EntrySort::CreatedAt),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            EntrySort::Id => "id",
            EntrySort::Amount => "amount",
            EntrySort::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ASC" | "asc" => Some(SortOrder::Asc),
            "DESC" | "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Resolved entry-search filter. Defaults are applied at the request
/// boundary; the store runs exactly what it is given.
#[derive(Debug, Clone)]
pub struct EntrySearch<'a> {
    pub owner_query: &'a str,
    pub min_amount: i64,
    pub max_amount: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub sort: EntrySort,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

pub struct EntryRepository;

impl EntryRepository {
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        account_id: i64,
        amount: i64,
    ) -> Result<Entry, StoreError> {
        sqlx::query_as(
            r#"INSERT INTO entries (account_id, amount)
               VALUES ($1, $2)
               RETURNING id, account_id, amount, created_at"#,
        )
        .bind(account_id)
        .bind(amount)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    pub async fn get<'e>(exec: impl PgExecutor<'e>, id: i64) -> Result<Entry, StoreError> {
        sqlx::query_as("SELECT id, account_id, amount, created_at FROM entries WHERE id = $1")
            .bind(id)
            .fetch_one(exec)
            .await
            .map_err(classify)
    }

    pub async fn list_by_account<'e>(
        exec: impl PgExecutor<'e>,
        account_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Entry>, StoreError> {
        sqlx::query_as(
            r#"SELECT id, account_id, amount, created_at FROM entries
               WHERE account_id = $1 ORDER BY id LIMIT $2 OFFSET $3"#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(exec)
        .await
        .map_err(classify)
    }

    pub async fn update_amount<'e>(
        exec: impl PgExecutor<'e>,
        id: i64,
        amount: i64,
    ) -> Result<Entry, StoreError> {
        sqlx::query_as(
            r#"UPDATE entries SET amount = $2 WHERE id = $1
               RETURNING id, account_id, amount, created_at"#,
        )
        .bind(id)
        .bind(amount)
        .fetch_one(exec)
        .await
        .map_err(classify)
    }

    /// Search entries whose account owner matches the query, constrained by
    /// amount and date ranges.
    pub async fn search_by_account_owner<'e>(
        exec: impl PgExecutor<'e>,
        search: EntrySearch<'_>,
    ) -> Result<Vec<Entry>, StoreError> {
        let sql = format!(
            r#"SELECT e.id, e.account_id, e.amount, e.created_at
               FROM entries e
               JOIN accounts a ON a.id = e.account_id
               WHERE a.owner ILIKE '%' || $1 || '%'
                 AND e.amount BETWEEN $2 AND $3
                 AND e.created_at BETWEEN $4 AND $5
               ORDER BY e.{} {} LIMIT $6 OFFSET $7"#,
            search.sort.as_sql(),
            search.order.as_sql(),
        );
        sqlx::query_as(&sql)
            .bind(search.owner_query)
            .bind(search.min_amount)
            .bind(search.max_amount)
            .bind(search.start_date)
            .bind(search.end_date)
            .bind(search.limit)
            .bind(search.offset)
            .fetch_all(exec)
            .await
            .map_err(classify)
    }

    pub async fn delete<'e>(exec: impl PgExecutor<'e>, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(exec)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parsing_whitelists_columns() {
        assert_eq!(EntrySort::parse("amount"), Some(EntrySort::Amount));
        assert_eq!(EntrySort::parse("created_at"), Some(EntrySort::CreatedAt));
        assert_eq!(EntrySort::parse("owner; DROP TABLE users"), None);
    }

    #[test]
    fn order_parsing_accepts_both_cases() {
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }
}
