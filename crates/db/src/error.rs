//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    /// A unique constraint rejected the row.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// A foreign-key or check constraint rejected the row.
    #[error("violates constraint {0}")]
    Constraint(String),

    /// The caller handed the clause builder something it must never see:
    /// an empty update or a predicate key outside the resource's table.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = db_err.constraint().unwrap_or("record").to_string();
            if db_err.is_unique_violation() {
                return DbError::Duplicate(constraint);
            }
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                return DbError::Constraint(constraint);
            }
        }
        DbError::Sqlx(err)
    }
}
