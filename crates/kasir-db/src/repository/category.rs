//! # Category Repository
//!
//! Database operations for product categories.
//!
//! Deleting a category leaves its products in place with `category_id`
//! cleared (`ON DELETE SET NULL`).

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, ServiceResult};
use kasir_core::{Category, CategoryField, CategoryInput, CategoryPatch};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM category ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM category WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn require(&self, id: i64) -> DbResult<Category> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Inserts a new category. Name and description are required.
    pub async fn create(&self, input: &CategoryInput) -> ServiceResult<Category> {
        input.validate()?;

        debug!(name = %input.name, "Inserting category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO category (name, description)
            VALUES (?1, ?2)
            RETURNING id, name, description
            "#,
        )
        .bind(input.name.trim())
        .bind(input.description.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Replaces both fields of an existing category.
    pub async fn update(&self, id: i64, input: &CategoryInput) -> ServiceResult<Category> {
        input.validate()?;

        debug!(id, "Updating category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE category SET name = ?2, description = ?3
            WHERE id = ?1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.description.trim())
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or_else(|| DbError::not_found("Category", id).into())
    }

    /// Applies only the fields present in `patch`.
    pub async fn patch(&self, id: i64, patch: &CategoryPatch) -> ServiceResult<Category> {
        patch.validate()?;

        let fields = patch.fields();
        if fields.is_empty() {
            return Ok(self.require(id).await?);
        }

        debug!(id, fields = fields.len(), "Patching category");

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE category SET ");
        {
            let mut set = query.separated(", ");
            for field in fields {
                set.push(field.column());
                set.push_unseparated(" = ");
                match field {
                    CategoryField::Name(value) | CategoryField::Description(value) => {
                        set.push_bind_unseparated(value.trim().to_string());
                    }
                }
            }
        }
        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id).into());
        }

        Ok(self.require(id).await?)
    }

    /// Deletes a category. Its products become uncategorized.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting category");

        let result = sqlx::query("DELETE FROM category WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasir_core::{ErrorKind, ProductInput};

    fn input(name: &str, description: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_category_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let food = repo.create(&input("Makanan", "Makanan berat")).await.unwrap();
        let drinks = repo.create(&input("Minuman", "Minuman dingin")).await.unwrap();
        assert_eq!(repo.list().await.unwrap(), vec![food.clone(), drinks.clone()]);

        let updated = repo.update(food.id, &input("Makanan", "Nasi dan lauk")).await.unwrap();
        assert_eq!(updated.description, "Nasi dan lauk");

        let patched = repo
            .patch(
                drinks.id,
                &CategoryPatch {
                    name: Some("Minuman Dingin".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.name, "Minuman Dingin");
        assert_eq!(patched.description, "Minuman dingin");

        repo.delete(food.id).await.unwrap();
        assert!(repo.get_by_id(food.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_ids_and_validation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let err = repo.update(5, &input("A", "B")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = repo.patch(5, &CategoryPatch::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        assert!(matches!(repo.delete(5).await, Err(DbError::NotFound { .. })));

        let err = repo.create(&input("Snack", "")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_clears_product_category() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db.categories().create(&input("Snack", "Camilan")).await.unwrap();
        let product = db
            .products()
            .create(&ProductInput {
                name: "Keripik".to_string(),
                price: 1000,
                stock: 3,
                category_id: Some(category.id),
            })
            .await
            .unwrap();
        assert_eq!(product.category_name.as_deref(), Some("Snack"));

        db.categories().delete(category.id).await.unwrap();

        let product = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(product.category_id, None);
        assert_eq!(product.category_name, None);
    }
}
