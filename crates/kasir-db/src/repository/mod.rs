//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories And What They Own                       │
//! │                                                                         │
//! │  Handler                                                               │
//! │       │                                                                 │
//! │       │  db.transactions().checkout(&items)                            │
//! │       ▼                                                                 │
//! │  TransactionRepository   ← checkout engine, ledger reads               │
//! │  ReportRepository        ← today / range reports                       │
//! │  ProductRepository       ← product CRUD + patch                        │
//! │  CategoryRepository      ← category CRUD + patch                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TransactionRepository`](transaction::TransactionRepository) - Atomic checkout, ledger listing
//! - [`ReportRepository`](report::ReportRepository) - Sales reports over a window
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD

pub mod category;
pub mod product;
pub mod report;
pub mod transaction;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{DbError, ServiceResult};

/// Runs `fut` under a caller deadline.
///
/// On expiry the future is dropped. Any open sqlx `Transaction` inside it
/// rolls back on drop, and a transient [`DbError::Timeout`] is returned.
pub(crate) async fn with_deadline<T, F>(operation: &str, deadline: Duration, fut: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, deadline_ms = deadline.as_millis() as u64, "Deadline expired");
            Err(DbError::Timeout(format!("{} exceeded {:?}", operation, deadline)).into())
        }
    }
}
