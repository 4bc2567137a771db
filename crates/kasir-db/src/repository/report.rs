//! # Report Repository
//!
//! The reporting engine: sales summaries over a window of local days.
//!
//! ## Report Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  range("2026-01-01", "2026-01-31")                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportWindow::parse  ── malformed → Validation error                  │
//! │       │                                                                 │
//! │       ├── start > end → Report::empty(), no query                      │
//! │       ▼                                                                 │
//! │  bounds_utc() = [local 00:00 start, local 00:00 end+1 or unbounded)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN (read)                                                          │
//! │    headers  ORDER BY created_at, id          → revenue, count          │
//! │    details  ORDER BY created_at, id, d.id    → qty per product         │
//! │  COMMIT                                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SalesTally::into_report()  (max qty, first seen wins ties)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use std::time::Duration;
use tracing::debug;

use super::with_deadline;
use crate::error::ServiceResult;
use kasir_core::{Report, ReportWindow, SalesTally};

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Report for the current local calendar day.
    pub async fn today(&self) -> ServiceResult<Report> {
        self.for_window(ReportWindow::today()).await
    }

    /// Report for `start` through `end` inclusive, both `YYYY-MM-DD`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let january = db.reports().range("2026-01-01", "2026-01-31").await?;
    /// ```
    pub async fn range(&self, start: &str, end: &str) -> ServiceResult<Report> {
        let window = ReportWindow::parse(start, end)?;
        self.for_window(window).await
    }

    /// Report for an already-built window.
    ///
    /// A window with no sales gives [`Report::empty`], never an error.
    pub async fn for_window(&self, window: ReportWindow) -> ServiceResult<Report> {
        if window.is_empty() {
            debug!(start = %window.start, end = %window.end, "Reversed window, empty report");
            return Ok(Report::empty());
        }

        let (from, until) = window.bounds_utc();
        debug!(%from, until = ?until, "Building report");

        // One snapshot for headers and details.
        let mut tx = self.pool.begin().await?;

        let totals: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT total_amount
            FROM transactions
            WHERE created_at >= ?1 AND (?2 IS NULL OR created_at < ?2)
            ORDER BY created_at, id
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&mut *tx)
        .await?;

        let lines: Vec<(i64, String, i64)> = sqlx::query_as(
            r#"
            SELECT d.product_id, d.product_name, d.quantity
            FROM transaction_details d
            INNER JOIN transactions t ON t.id = d.transaction_id
            WHERE t.created_at >= ?1 AND (?2 IS NULL OR t.created_at < ?2)
            ORDER BY t.created_at, t.id, d.id
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut tally = SalesTally::new();
        for total in totals {
            tally.record_transaction(total)?;
        }
        for (product_id, product_name, quantity) in &lines {
            tally.record_line(*product_id, product_name, *quantity);
        }

        let report = tally.into_report();
        debug!(
            revenue = report.total_revenue,
            transactions = report.total_transaction,
            best = %report.highest_selling.name,
            "Report built"
        );
        Ok(report)
    }

    /// [`for_window`](Self::for_window) with a caller-imposed deadline.
    pub async fn for_window_with_deadline(
        &self,
        window: ReportWindow,
        deadline: Duration,
    ) -> ServiceResult<Report> {
        with_deadline("report", deadline, self.for_window(window)).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{DateTime, NaiveDate, Utc};
    use kasir_core::{CheckoutItem, ErrorKind, Product, ProductInput, ProductSold};

    async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
        db.products()
            .create(&ProductInput {
                name: name.to_string(),
                price,
                stock,
                category_id: None,
            })
            .await
            .unwrap()
    }

    /// Writes a ledger entry with a chosen timestamp.
    async fn insert_sale(db: &Database, at: DateTime<Utc>, lines: &[(i64, &str, i64, i64)]) {
        let total: i64 = lines.iter().map(|l| l.3).sum();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (total_amount, created_at) VALUES (?1, ?2) RETURNING id",
        )
        .bind(total)
        .bind(at)
        .fetch_one(db.pool())
        .await
        .unwrap();

        for (product_id, name, quantity, sub_total) in lines {
            sqlx::query(
                r#"
                INSERT INTO transaction_details
                    (transaction_id, product_id, product_name, quantity, sub_total)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(id)
            .bind(*product_id)
            .bind(*name)
            .bind(*quantity)
            .bind(*sub_total)
            .execute(db.pool())
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_report() {
        let db = memory_db().await;
        let report = db.reports().today().await.unwrap();
        assert_eq!(report, Report::empty());

        let report = db.reports().range("2026-01-01", "2026-01-31").await.unwrap();
        assert_eq!(report.highest_selling, ProductSold::default());
    }

    #[tokio::test]
    async fn test_today_after_checkouts() {
        let db = memory_db().await;
        let kopi = product(&db, "Kopi", 1500, 20).await;
        let teh = product(&db, "Teh", 500, 20).await;
        let repo = db.transactions();

        repo.checkout(&[CheckoutItem::new(kopi.id, 3)]).await.unwrap();
        repo.checkout(&[CheckoutItem::new(kopi.id, 7), CheckoutItem::new(teh.id, 9)])
            .await
            .unwrap();

        let report = db.reports().today().await.unwrap();
        assert_eq!(report.total_revenue, 4500 + 10_500 + 4500);
        assert_eq!(report.total_transaction, 2);
        assert_eq!(
            report.highest_selling,
            ProductSold {
                name: "Kopi".to_string(),
                qty: 10
            }
        );

        // No intervening checkouts, same answer.
        assert_eq!(db.reports().today().await.unwrap(), report);
    }

    #[tokio::test]
    async fn test_tie_goes_to_first_sold() {
        let db = memory_db().await;
        let roti = product(&db, "Roti", 500, 10).await;
        let susu = product(&db, "Susu", 900, 10).await;

        db.transactions()
            .checkout(&[CheckoutItem::new(susu.id, 2), CheckoutItem::new(roti.id, 2)])
            .await
            .unwrap();

        let report = db.reports().today().await.unwrap();
        assert_eq!(report.highest_selling.name, "Susu");
        assert_eq!(report.highest_selling.qty, 2);
    }

    #[tokio::test]
    async fn test_window_boundaries() {
        let db = memory_db().await;
        let day = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        let window = ReportWindow::for_day(day);
        let (from, until) = window.bounds_utc();
        let until = until.unwrap();
        let second = chrono::Duration::seconds(1);

        insert_sale(&db, from - second, &[(1, "Kemarin", 50, 5000)]).await;
        insert_sale(&db, from, &[(2, "Pagi", 1, 100)]).await;
        insert_sale(&db, until - second, &[(3, "Malam", 2, 200)]).await;
        insert_sale(&db, until, &[(1, "Besok", 50, 5000)]).await;

        let report = db.reports().for_window(window).await.unwrap();
        assert_eq!(report.total_transaction, 2);
        assert_eq!(report.total_revenue, 300);
        assert_eq!(report.highest_selling.name, "Malam");

        let report = db.reports().range("2026-01-13", "2026-01-15").await.unwrap();
        assert_eq!(report.total_transaction, 4);
        assert_eq!(report.highest_selling.name, "Kemarin");
        assert_eq!(report.highest_selling.qty, 100);
    }

    #[tokio::test]
    async fn test_range_ending_on_last_representable_day() {
        let db = memory_db().await;
        let kopi = product(&db, "Kopi", 1500, 10).await;
        db.transactions()
            .checkout(&[CheckoutItem::new(kopi.id, 2)])
            .await
            .unwrap();

        let report = db.reports().range("2000-01-01", "9999-12-31").await.unwrap();
        assert_eq!(report.total_transaction, 1);
        assert_eq!(report.total_revenue, 3000);
        assert_eq!(report.highest_selling.name, "Kopi");

        let err = db.reports().range("2000-01-01", "+10000-01-01").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_bad_and_reversed_ranges() {
        let db = memory_db().await;
        insert_sale(&db, Utc::now(), &[(1, "Kopi", 1, 1500)]).await;

        let err = db.reports().range("2026/01/01", "2026-01-31").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = db.reports().range("2026-01-01", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let report = db.reports().range("2026-02-01", "2026-01-01").await.unwrap();
        assert_eq!(report, Report::empty());
    }

    #[tokio::test]
    async fn test_report_with_deadline() {
        let db = memory_db().await;
        insert_sale(&db, Utc::now(), &[(1, "Kopi", 2, 3000)]).await;

        let report = db
            .reports()
            .for_window_with_deadline(ReportWindow::today(), Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(report.total_revenue, 3000);
        assert_eq!(report.total_transaction, 1);
    }
}
