//! Error handling utilities for repositories

use blog_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Like [`map_db_error`], but constraint violations on the ledger tables
/// become integrity conflicts.
///
/// A CHECK violation means a counter would have gone negative; a unique
/// violation means a second record for the same user was attempted.
pub fn map_ledger_error(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_check_violation() || db_err.is_unique_violation() {
            return DomainError::LedgerIntegrity(db_err.message().to_string());
        }
    }
    map_db_error(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_database_errors() {
        let err = map_ledger_error(SqlxError::RowNotFound);
        assert!(matches!(err, DomainError::DatabaseError(_)));
        assert!(!err.is_conflict());
    }
}
