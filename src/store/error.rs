//! Store error taxonomy.
//!
//! `sqlx::Error` is classified exactly once, here, at the store boundary.
//! Callers match on [`StoreError`] variants; driver-specific codes never
//! leak past this module.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup matched no row.
    #[error("record not found")]
    NotFound,

    /// A database constraint rejected the write.
    #[error("{kind} constraint violated ({constraint})")]
    Constraint {
        kind: ConstraintKind,
        constraint: String,
        #[source]
        source: sqlx::Error,
    },

    /// Transaction begin or commit failed.
    #[error("transaction {phase} failed")]
    Transaction {
        phase: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The unit of work failed and the rollback that followed failed too.
    /// Both causes are carried; the rollback failure is never dropped.
    #[error("unit of work failed: {source}; rollback failed: {rollback}")]
    RollbackFailed {
        source: Box<StoreError>,
        rollback: sqlx::Error,
    },

    /// Connectivity or timeout failure talking to the database.
    #[error("database i/o failure")]
    Io(#[source] sqlx::Error),

    /// Any other driver error.
    #[error("database error")]
    Database(#[source] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not null",
            ConstraintKind::Check => "check",
        };
        f.write_str(name)
    }
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            StoreError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Classify a driver error into the service taxonomy.
pub(crate) fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Io(err)
        }
        sqlx::Error::Database(db) => {
            let kind = match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                sqlx::error::ErrorKind::ForeignKeyViolation => Some(ConstraintKind::ForeignKey),
                sqlx::error::ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                sqlx::error::ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                _ => None,
            };
            match kind {
                Some(kind) => {
                    let constraint = db.constraint().unwrap_or("unknown").to_string();
                    StoreError::Constraint {
                        kind,
                        constraint,
                        source: sqlx::Error::Database(db),
                    }
                }
                None => StoreError::Database(sqlx::Error::Database(db)),
            }
        }
        other => StoreError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_not_found() {
        let err = classify(sqlx::Error::RowNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn io_errors_are_io() {
        let io: sqlx::Error =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset").into();
        assert!(matches!(classify(io), StoreError::Io(_)));
    }

    #[test]
    fn display_carries_constraint_name() {
        let err = StoreError::Constraint {
            kind: ConstraintKind::ForeignKey,
            constraint: "accounts_owner_fkey".to_string(),
            source: sqlx::Error::RowNotFound,
        };
        let text = err.to_string();
        assert!(text.contains("foreign key"));
        assert!(text.contains("accounts_owner_fkey"));
    }
}
