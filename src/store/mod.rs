//! PostgreSQL-backed ledger storage.
//!
//! Row accessors are generic over the executor, so the same query runs
//! against the connection pool or inside a live transaction. The
//! transactional units of work (transfer engine, cascading user delete)
//! live in [`tx`]; driver errors are classified once, in [`error`].

pub mod db;
pub mod error;
pub mod models;

pub mod accounts;
pub mod entries;
pub mod transfers;
pub mod users;

pub mod tx;

pub use db::Database;
pub use error::{ConstraintKind, StoreError};
pub use models::{Account, Entry, Transfer, User};
pub use tx::{Store, TransferTxParams, TransferTxResult};
