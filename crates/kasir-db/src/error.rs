//! # Database Error Types
//!
//! Error types for database operations and for the engines built on them.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (kasir-core)             │
//! │       │                                   │                             │
//! │       ▼                                   │                             │
//! │  DbError ← Adds context, spots busy/locked │                            │
//! │       │                                   │                             │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │  ServiceError ← What checkout/report/catalog calls return              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kind() → Validation | NotFound | BusinessRule | Transient | Fatal     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::{CoreError, ErrorKind, ValidationError};
use thiserror::Error;

/// SQLite result codes that mean "another connection holds the lock".
///
/// `5` SQLITE_BUSY, `6` SQLITE_LOCKED, `517` SQLITE_BUSY_SNAPSHOT,
/// `262` SQLITE_LOCKED_SHAREDCACHE.
const SQLITE_BUSY_CODES: &[&str] = &["5", "6", "262", "517"];

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - Update/patch/delete on an id that doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Product referencing a category that doesn't exist
    /// - Deleting a transaction header that still has detail rows
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Another connection holds the write lock and the busy timeout ran out.
    #[error("Database busy: {0}")]
    Busy(String),

    /// The caller's deadline expired before the operation finished.
    ///
    /// The unit of work was dropped, so nothing it wrote is visible.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - SQL error not covered above (CHECK constraint, syntax)
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Classifies this error for the caller.
    ///
    /// ## Mapping
    /// ```text
    /// NotFound                                   → NotFound
    /// ForeignKeyViolation                        → Validation
    /// Busy, Timeout, ConnectionFailed,
    /// PoolExhausted                              → Transient
    /// everything else                            → Fatal
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::ForeignKeyViolation { .. } => ErrorKind::Validation,
            DbError::Busy(_)
            | DbError::Timeout(_)
            | DbError::ConnectionFailed(_)
            | DbError::PoolExhausted => ErrorKind::Transient,
            DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => ErrorKind::Fatal,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Busy by result code, else analyze message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io             → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let busy = db_err
                    .code()
                    .map(|code| SQLITE_BUSY_CODES.iter().any(|busy| code == *busy))
                    .unwrap_or(false);

                // FK constraint: "FOREIGN KEY constraint failed"
                if busy || msg.contains("database is locked") {
                    DbError::Busy(msg.to_string())
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Service Error
// =============================================================================

/// Any failure of a checkout, report or catalog call.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A business rule or input check failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Core(e) => e.kind(),
            ServiceError::Db(e) => e.kind(),
        }
    }

    /// True only for transient failures; the whole call can be repeated.
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(err.into())
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(err.into())
    }
}

/// Result type for engine and repository calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
