//! Transactional units of work.
//!
//! [`Store::run_in_tx`] owns the begin/commit/rollback protocol; the
//! transfer engine and the cascading user delete are expressed as units of
//! work on top of it. Either everything a unit writes becomes visible at
//! commit, or nothing does.

use futures::future::BoxFuture;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use super::accounts::AccountRepository;
use super::entries::EntryRepository;
use super::error::StoreError;
use super::models::{Account, Entry, Transfer};
use super::transfers::TransferRepository;
use super::users::UserRepository;

/// Shared handle to the ledger database. Cloning is cheap (the pool is
/// reference-counted); construct once at startup and inject everywhere.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

/// Input of the transfer unit of work. The amount is in the smallest
/// currency unit and must be positive; that is validated at the request
/// boundary and not re-checked here.
#[derive(Debug, Clone, Copy)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Everything a committed transfer produced: the transfer row, both ledger
/// entries, and both post-update account snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `unit` inside a database transaction.
    ///
    /// Commits when the unit returns `Ok`, rolls back when it returns
    /// `Err`. A rollback failure is reported together with the unit's own
    /// error, never instead of it.
    pub async fn run_in_tx<T, F>(&self, unit: F) -> Result<T, StoreError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, StoreError>>,
    {
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Transaction {
            phase: "begin",
            source: e,
        })?;

        match unit(&mut *tx).await {
            Ok(value) => {
                tx.commit().await.map_err(|e| StoreError::Transaction {
                    phase: "commit",
                    source: e,
                })?;
                Ok(value)
            }
            Err(unit_err) => match tx.rollback().await {
                Ok(()) => Err(unit_err),
                Err(rollback) => Err(StoreError::RollbackFailed {
                    source: Box::new(unit_err),
                    rollback,
                }),
            },
        }
    }

    /// Move `amount` between two accounts as one atomic unit: transfer row,
    /// debit entry, credit entry, then both balance updates in lock order.
    pub async fn transfer_tx(&self, arg: TransferTxParams) -> Result<TransferTxResult, StoreError> {
        self.run_in_tx(move |conn| {
            Box::pin(async move {
                let transfer = TransferRepository::create(
                    &mut *conn,
                    arg.from_account_id,
                    arg.to_account_id,
                    arg.amount,
                )
                .await?;

                let from_entry =
                    EntryRepository::create(&mut *conn, arg.from_account_id, -arg.amount).await?;
                let to_entry =
                    EntryRepository::create(&mut *conn, arg.to_account_id, arg.amount).await?;

                let (from_account, to_account) = apply_balance_deltas(
                    conn,
                    (arg.from_account_id, -arg.amount),
                    (arg.to_account_id, arg.amount),
                )
                .await?;

                Ok(TransferTxResult {
                    transfer,
                    from_account,
                    to_account,
                    from_entry,
                    to_entry,
                })
            })
        })
        .await
    }

    /// Delete `username` and every account they own, atomically.
    ///
    /// Entries and transfers referencing those accounts are not touched; a
    /// foreign-key violation from such references aborts the whole unit.
    pub async fn delete_user_with_accounts_tx(&self, username: &str) -> Result<(), StoreError> {
        let username = username.to_owned();
        self.run_in_tx(move |conn| {
            Box::pin(async move {
                UserRepository::get(&mut *conn, &username).await?;

                let accounts = AccountRepository::list_all_by_owner(&mut *conn, &username).await?;
                for account in &accounts {
                    AccountRepository::delete(&mut *conn, account.id).await?;
                }

                UserRepository::delete(&mut *conn, &username).await?;
                Ok(())
            })
        })
        .await
    }
}

/// Lock-order rule for balance updates: the account with the lower id is
/// updated first, whichever direction the money flows. Every concurrent
/// transfer therefore acquires its two row locks in the same total order,
/// so opposite-direction transfers on one account pair cannot circular-wait.
fn ordered_by_lock(a: (i64, i64), b: (i64, i64)) -> ((i64, i64), (i64, i64)) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

/// Apply `(account_id, delta)` pairs in lock order, returning the updated
/// snapshots back in `(from, to)` request order.
async fn apply_balance_deltas(
    conn: &mut PgConnection,
    from: (i64, i64),
    to: (i64, i64),
) -> Result<(Account, Account), StoreError> {
    let (first, second) = ordered_by_lock(from, to);

    let first_account = AccountRepository::add_balance(&mut *conn, first.0, first.1).await?;
    let second_account = AccountRepository::add_balance(&mut *conn, second.0, second.1).await?;

    if first.0 == from.0 && first.1 == from.1 {
        Ok((first_account, second_account))
    } else {
        Ok((second_account, first_account))
    }
}

#[cfg(test)]
mod tests {
    use super::ordered_by_lock;
    use rand::Rng;

    #[test]
    fn lower_id_is_always_first() {
        assert_eq!(ordered_by_lock((1, -5), (2, 5)), ((1, -5), (2, 5)));
        assert_eq!(ordered_by_lock((9, -5), (3, 5)), ((3, 5), (9, -5)));
    }

    #[test]
    fn deltas_stay_with_their_accounts() {
        let (first, second) = ordered_by_lock((42, 100), (7, -100));
        assert_eq!(first, (7, -100));
        assert_eq!(second, (42, 100));
    }

    /// Opposite-direction transfers over the same pair must pick the same
    /// first account, for every pair. This is the deadlock-avoidance
    /// invariant; a regression here deadlocks production under load.
    #[test]
    fn both_directions_lock_the_same_account_first() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let a = rng.gen_range(1..1_000i64);
            let b = rng.gen_range(1..1_000i64);
            let amount = rng.gen_range(1..10_000i64);

            let forward = ordered_by_lock((a, -amount), (b, amount));
            let reverse = ordered_by_lock((b, -amount), (a, amount));

            assert!(forward.0.0 <= forward.1.0);
            assert!(reverse.0.0 <= reverse.1.0);
            assert_eq!(forward.0.0, reverse.0.0);
        }
    }
}
