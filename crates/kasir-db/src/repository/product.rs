//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - List (optional name filter) and lookup by id
//! - Create, full update, sparse patch, delete
//!
//! Stock is only ever decremented by the checkout engine
//! ([`TransactionRepository`](super::transaction::TransactionRepository));
//! this repository sets it absolutely on create/update/patch.
//!
//! ## Patch As A Field Update Set
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PATCH /product/7  {"price": 1750, "stock": 40}                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductPatch::fields() = [Price(1750), Stock(40)]                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  QueryBuilder:  UPDATE product SET price = ?, stock = ? WHERE id = ?   │
//! │                                                                         │
//! │  Absent fields never appear in the statement. An empty set performs    │
//! │  no write and returns the current row.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, ServiceResult};
use kasir_core::{Product, ProductField, ProductInput, ProductPatch};

/// Columns every product read returns, category name joined in.
const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.price,
        p.stock,
        p.category_id,
        c.name AS category_name
    FROM product p
    LEFT JOIN category c ON c.id = p.category_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.list(None).await?;
/// let coffee = repo.list(Some("kopi")).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by id.
    ///
    /// ## Arguments
    /// * `name_filter` - Case-insensitive substring match on the name.
    ///   `None` or blank returns everything.
    pub async fn list(&self, name_filter: Option<&str>) -> DbResult<Vec<Product>> {
        let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());

        debug!(filter = ?filter, "Listing products");

        let products = match filter {
            Some(name) => {
                let sql = format!(
                    "{} WHERE LOWER(p.name) LIKE '%' || LOWER(?1) || '%' ESCAPE '\\' ORDER BY p.id",
                    PRODUCT_SELECT
                );
                sqlx::query_as::<_, Product>(&sql)
                    .bind(escape_like(name))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} ORDER BY p.id", PRODUCT_SELECT);
                sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?
            }
        };

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{} WHERE p.id = ?1", PRODUCT_SELECT);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn require(&self, id: i64) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with its generated id
    /// * `Err(Validation)` - Blank name, negative price or stock
    /// * `Err(ForeignKeyViolation)` - `category_id` doesn't exist
    pub async fn create(&self, input: &ProductInput) -> ServiceResult<Product> {
        input.validate()?;

        debug!(name = %input.name, "Inserting product");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO product (name, price, stock, category_id)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(self.require(id).await?)
    }

    /// Replaces every field of an existing product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, input: &ProductInput) -> ServiceResult<Product> {
        input.validate()?;

        debug!(id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE product SET
                name = ?2,
                price = ?3,
                stock = ?4,
                category_id = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id).into());
        }

        Ok(self.require(id).await?)
    }

    /// Applies only the fields present in `patch`.
    pub async fn patch(&self, id: i64, patch: &ProductPatch) -> ServiceResult<Product> {
        patch.validate()?;

        let fields = patch.fields();
        if fields.is_empty() {
            debug!(id, "Empty product patch, returning current row");
            return Ok(self.require(id).await?);
        }

        debug!(id, fields = fields.len(), "Patching product");

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE product SET ");
        {
            let mut set = query.separated(", ");
            for field in fields {
                set.push(field.column());
                set.push_unseparated(" = ");
                match field {
                    ProductField::Name(name) => set.push_bind_unseparated(name.trim().to_string()),
                    ProductField::Price(price) => set.push_bind_unseparated(price),
                    ProductField::Stock(stock) => set.push_bind_unseparated(stock),
                    ProductField::CategoryId(category_id) => set.push_bind_unseparated(category_id),
                };
            }
        }
        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id).into());
        }

        Ok(self.require(id).await?)
    }

    /// Deletes a product.
    ///
    /// Ledger lines that sold it keep their own name snapshot.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM product WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes `%`, `_` and `\\` so a LIKE pattern matches them literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasir_core::{CategoryInput, ErrorKind};

    fn input(name: &str, price: i64, stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price,
            stock,
            category_id: None,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let repo = db.products();

        let created = repo.create(&input("Kopi Susu", 1500, 10)).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.name, "Kopi Susu");
        assert_eq!(created.category_name, None);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get_by_id(9999).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = db().await;
        let err = db.products().create(&input("", 1500, 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = db.products().create(&input("Teh", -1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let db = db().await;
        let mut product = input("Teh", 1000, 1);
        product.category_id = Some(77);

        let err = db.products().create(&product).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_with_name_filter() {
        let db = db().await;
        let repo = db.products();
        repo.create(&input("Kopi Hitam", 1000, 5)).await.unwrap();
        repo.create(&input("Teh Manis", 800, 5)).await.unwrap();
        repo.create(&input("Es KOPI", 1200, 5)).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let coffee = repo.list(Some("kopi")).await.unwrap();
        let names: Vec<_> = coffee.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Kopi Hitam", "Es KOPI"]);

        assert_eq!(repo.list(Some("  ")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_name_filter_matches_wildcards_literally() {
        let db = db().await;
        let repo = db.products();
        repo.create(&input("Kopi Hitam", 1000, 5)).await.unwrap();
        repo.create(&input("Diskon 50% Teh", 800, 5)).await.unwrap();
        repo.create(&input("Roti_Bakar", 700, 5)).await.unwrap();
        repo.create(&input("Susu\\Coklat", 900, 5)).await.unwrap();

        assert_eq!(repo.list(Some("_")).await.unwrap().len(), 1);
        assert_eq!(repo.list(Some("_")).await.unwrap()[0].name, "Roti_Bakar");
        assert_eq!(repo.list(Some("50%")).await.unwrap()[0].name, "Diskon 50% Teh");
        assert_eq!(repo.list(Some("%")).await.unwrap().len(), 1);
        assert_eq!(repo.list(Some("\\")).await.unwrap()[0].name, "Susu\\Coklat");
        assert!(repo.list(Some("kopi%hitam")).await.unwrap().is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("kopi"), "kopi");
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[tokio::test]
    async fn test_update_and_missing_id() {
        let db = db().await;
        let repo = db.products();
        let created = repo.create(&input("Roti", 500, 3)).await.unwrap();

        let updated = repo.update(created.id, &input("Roti Bakar", 700, 4)).await.unwrap();
        assert_eq!(updated.name, "Roti Bakar");
        assert_eq!(updated.price, 700);
        assert_eq!(updated.stock, 4);

        let err = repo.update(404, &input("X", 1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_patch_applies_only_present_fields() {
        let db = db().await;
        let category = db
            .categories()
            .create(&CategoryInput {
                name: "Minuman".to_string(),
                description: "Minuman dingin".to_string(),
            })
            .await
            .unwrap();
        let repo = db.products();
        let created = repo.create(&input("Es Teh", 500, 20)).await.unwrap();

        let patched = repo
            .patch(
                created.id,
                &ProductPatch {
                    price: Some(750),
                    category_id: Some(category.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.name, "Es Teh");
        assert_eq!(patched.stock, 20);
        assert_eq!(patched.price, 750);
        assert_eq!(patched.category_name.as_deref(), Some("Minuman"));

        let unchanged = repo.patch(created.id, &ProductPatch::default()).await.unwrap();
        assert_eq!(unchanged, patched);

        let err = repo.patch(404, &ProductPatch::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = repo
            .patch(
                404,
                &ProductPatch {
                    stock: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let repo = db.products();
        let created = repo.create(&input("Gula", 300, 1)).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(created.id).await, Err(DbError::NotFound { .. })));
    }
}
