//! # Transaction Repository
//!
//! The checkout engine and the ledger reads.
//!
//! ## Checkout Unit Of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    checkout([(A, 2), (B, 1)])                           │
//! │                                                                         │
//! │  validate items (non-empty, qty ≥ 1)        ← no store access yet      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │  for each item, in request order:                                      │
//! │     UPDATE product SET stock = stock - q                               │
//! │      WHERE id = ? AND stock >= q            ← write lock held from     │
//! │       │                                       here until COMMIT        │
//! │       ├── 0 rows, no product   → ProductNotFound    ─┐                 │
//! │       ├── 0 rows, low stock    → InsufficientStock  ─┤ ROLLBACK        │
//! │       │                                              │ (on drop)       │
//! │       └── 1 row → read name + price,                 │                 │
//! │                   sub_total = price × q, total += sub_total            │
//! │       │                                              │                 │
//! │       ▼                                              │                 │
//! │  INSERT transactions (total_amount, created_at)     │                 │
//! │  INSERT transaction_details × n                      │                 │
//! │       │                                              │                 │
//! │       ▼                                              ▼                 │
//! │  COMMIT                                   nothing persisted            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why The Guarded UPDATE Comes First
//! The decrement is the first statement of the unit of work, so SQLite takes
//! the write lock before any product row is read. A second checkout on
//! another connection waits on that lock (busy timeout), then re-evaluates
//! `stock >= q` against the committed value. Stock can never go negative
//! and two checkouts can never both take the last unit.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::with_deadline;
use crate::error::{DbResult, ServiceResult};
use kasir_core::validation::validate_checkout_items;
use kasir_core::{CheckoutItem, CoreError, Money, Transaction, TransactionDetail};

const DETAIL_SELECT: &str = r#"
    SELECT id, transaction_id, product_id, product_name, quantity, sub_total
    FROM transaction_details
"#;

/// Repository for the checkout engine and ledger reads.
///
/// ## Usage
/// ```rust,ignore
/// let sale = db
///     .transactions()
///     .checkout(&[CheckoutItem::new(1, 2), CheckoutItem::new(3, 1)])
///     .await?;
/// assert_eq!(sale.details_total(), sale.total());
/// ```
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

/// A priced line waiting for its header id.
struct PricedLine {
    product_id: i64,
    product_name: String,
    quantity: i64,
    sub_total: Money,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Atomically sells `items`.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - Committed header with its details in request order
    /// * `Err` kind `Validation` - Empty list or a quantity below 1
    /// * `Err` kind `NotFound` - A product id doesn't exist
    /// * `Err` kind `BusinessRule` - Not enough stock for some line
    /// * `Err` kind `Transient` - Store busy or unreachable; retry the call
    ///
    /// On every error no stock changes and no ledger rows are written.
    pub async fn checkout(&self, items: &[CheckoutItem]) -> ServiceResult<Transaction> {
        validate_checkout_items(items)?;

        debug!(lines = items.len(), "Starting checkout");

        let mut tx = self.pool.begin().await?;

        // Early returns drop `tx`, which rolls it back.
        let sale = match apply_checkout(&mut *tx, items).await {
            Ok(sale) => sale,
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Checkout aborted");
                return Err(e);
            }
        };

        tx.commit().await?;

        info!(
            transaction_id = sale.id,
            total = %sale.total(),
            lines = sale.details.len(),
            "Checkout committed"
        );
        Ok(sale)
    }

    /// [`checkout`](Self::checkout) with a caller-imposed deadline.
    ///
    /// If the deadline passes first the unit of work is dropped and rolled
    /// back, and a retryable `Timeout` error is returned.
    pub async fn checkout_with_deadline(
        &self,
        items: &[CheckoutItem],
        deadline: Duration,
    ) -> ServiceResult<Transaction> {
        with_deadline("checkout", deadline, self.checkout(items)).await
    }

    /// Every transaction detail ever written, ordered by id.
    pub async fn list_details(&self) -> DbResult<Vec<TransactionDetail>> {
        let sql = format!("{} ORDER BY id", DETAIL_SELECT);
        let details = sqlx::query_as::<_, TransactionDetail>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(details)
    }

    /// Gets one transaction with its details.
    ///
    /// ## Returns
    /// * `Ok(Some(Transaction))` - Header found
    /// * `Ok(None)` - No such transaction
    pub async fn get(&self, id: i64) -> DbResult<Option<Transaction>> {
        // Header and details from the same snapshot.
        let mut tx = self.pool.begin().await?;

        let header: Option<(i64, i64, DateTime<Utc>)> =
            sqlx::query_as("SELECT id, total_amount, created_at FROM transactions WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((id, total_amount, created_at)) = header else {
            return Ok(None);
        };

        let sql = format!("{} WHERE transaction_id = ?1 ORDER BY id", DETAIL_SELECT);
        let details = sqlx::query_as::<_, TransactionDetail>(&sql)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(Transaction {
            id,
            total_amount,
            created_at,
            details,
        }))
    }

    /// Number of committed transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Runs the checkout statements on an open unit of work.
///
/// The caller owns the transaction: it commits on `Ok` and drops (rolls
/// back) on `Err`. Items must already be validated.
pub async fn apply_checkout(
    conn: &mut SqliteConnection,
    items: &[CheckoutItem],
) -> ServiceResult<Transaction> {
    let mut total = Money::zero();
    let mut lines: Vec<PricedLine> = Vec::with_capacity(items.len());

    for item in items {
        let decremented = sqlx::query(
            r#"
            UPDATE product
            SET stock = stock - ?1
            WHERE id = ?2 AND stock >= ?1
            "#,
        )
        .bind(item.quantity)
        .bind(item.product_id)
        .execute(&mut *conn)
        .await?;

        if decremented.rows_affected() == 0 {
            let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM product WHERE id = ?1")
                .bind(item.product_id)
                .fetch_optional(&mut *conn)
                .await?;

            let err = match available {
                None => CoreError::ProductNotFound(item.product_id),
                Some(available) => CoreError::InsufficientStock {
                    product_id: item.product_id,
                    available,
                    requested: item.quantity,
                },
            };
            return Err(err.into());
        }

        let (product_name, price): (String, i64) =
            sqlx::query_as("SELECT name, price FROM product WHERE id = ?1")
                .bind(item.product_id)
                .fetch_one(&mut *conn)
                .await?;

        let sub_total = Money::from_minor(price)
            .checked_mul_quantity(item.quantity)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: format!("subtotal for product {}", item.product_id),
            })?;
        total = total
            .checked_add(sub_total)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: "transaction total".to_string(),
            })?;

        debug!(
            product_id = item.product_id,
            quantity = item.quantity,
            sub_total = sub_total.minor(),
            "Line reserved"
        );

        lines.push(PricedLine {
            product_id: item.product_id,
            product_name,
            quantity: item.quantity,
            sub_total,
        });
    }

    let created_at = Utc::now();

    let transaction_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO transactions (total_amount, created_at)
        VALUES (?1, ?2)
        RETURNING id
        "#,
    )
    .bind(total.minor())
    .bind(created_at)
    .fetch_one(&mut *conn)
    .await?;

    let mut details = Vec::with_capacity(lines.len());
    for line in lines {
        let detail_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transaction_details
                (transaction_id, product_id, product_name, quantity, sub_total)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(transaction_id)
        .bind(line.product_id)
        .bind(line.product_name.as_str())
        .bind(line.quantity)
        .bind(line.sub_total.minor())
        .fetch_one(&mut *conn)
        .await?;

        details.push(TransactionDetail {
            id: detail_id,
            transaction_id,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            sub_total: line.sub_total.minor(),
        });
    }

    Ok(Transaction {
        id: transaction_id,
        total_amount: total.minor(),
        created_at,
        details,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
