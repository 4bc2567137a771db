//! # Domain Types
//!
//! Catalog, ledger and report types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Category     │◄──│     Product     │   │   CheckoutItem      │   │
//! │  │  id, name,      │   │  id, name,      │   │  product_id, qty    │   │
//! │  │  description    │   │  price, stock   │   │  (input only)       │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │  Transaction    │──►│ TransactionDetail   │   │     Report      │   │
//! │  │  total_amount   │   │ product snapshot,   │   │  revenue, count │   │
//! │  │  created_at     │   │ quantity, sub_total │   │  highest_selling│   │
//! │  └─────────────────┘   └─────────────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identities are store-generated integers. Money columns are `i64` minor
//! units; use the accessor methods to get a [`Money`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::validation::{
    validate_category_description, validate_category_name, validate_price, validate_product_name,
    validate_stock, ValidationResult,
};

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Full category payload for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: String,
}

impl CategoryInput {
    /// Both fields are required.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_category_name(&self.name)?;
        validate_category_description(&self.description)
    }
}

/// Sparse category update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One assignment in a category field update set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryField {
    Name(String),
    Description(String),
}

impl CategoryField {
    /// Column this assignment writes.
    pub const fn column(&self) -> &'static str {
        match self {
            CategoryField::Name(_) => "name",
            CategoryField::Description(_) => "description",
        }
    }
}

impl CategoryPatch {
    /// Validates only the fields that are present.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_category_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_category_description(description)?;
        }
        Ok(())
    }

    /// The assignments this patch carries, in column order.
    pub fn fields(&self) -> Vec<CategoryField> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(CategoryField::Name(name.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(CategoryField::Description(description.clone()));
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Store-generated identifier.
    pub id: i64,

    /// Display name, copied onto ledger lines at time of sale.
    pub name: String,

    /// Unit price in minor currency units.
    pub price: i64,

    /// Sellable units currently available. Never negative.
    pub stock: i64,

    /// Owning category, if any.
    pub category_id: Option<i64>,

    /// Category name (read-only, joined on read).
    pub category_name: Option<String>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

/// Full product payload for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl ProductInput {
    /// Name is required; price and stock must be non-negative.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)
    }
}

/// Sparse product update. Absent fields are left untouched.
///
/// ## Field Update Set
/// ```text
/// PATCH {"price": 1750}
///      │
///      ▼
/// ProductPatch { price: Some(1750), .. }
///      │
///      ▼
/// fields() = [Price(1750)]
///      │
///      ▼
/// UPDATE product SET price = ? WHERE id = ?
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// One assignment in a product field update set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductField {
    Name(String),
    Price(i64),
    Stock(i64),
    CategoryId(i64),
}

impl ProductField {
    /// Column this assignment writes.
    pub const fn column(&self) -> &'static str {
        match self {
            ProductField::Name(_) => "name",
            ProductField::Price(_) => "price",
            ProductField::Stock(_) => "stock",
            ProductField::CategoryId(_) => "category_id",
        }
    }
}

impl ProductPatch {
    /// Validates only the fields that are present.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(())
    }

    /// The assignments this patch carries, in column order.
    pub fn fields(&self) -> Vec<ProductField> {
        let mut fields = Vec::new();
        if let Some(name) = &self.name {
            fields.push(ProductField::Name(name.clone()));
        }
        if let Some(price) = self.price {
            fields.push(ProductField::Price(price));
        }
        if let Some(stock) = self.stock {
            fields.push(ProductField::Stock(stock));
        }
        if let Some(category_id) = self.category_id {
            fields.push(ProductField::CategoryId(category_id));
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none() && self.category_id.is_none()
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// One requested line of a checkout.
///
/// Duplicated product ids are independent lines, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl CheckoutItem {
    pub const fn new(product_id: i64, quantity: i64) -> Self {
        CheckoutItem {
            product_id,
            quantity,
        }
    }
}

/// Checkout request body: `{"items": [{"product_id": 1, "quantity": 2}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

// =============================================================================
// Ledger
// =============================================================================

/// A completed sale. Immutable once committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Sum of the details' `sub_total`.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount)
    }

    /// Sum of line subtotals. Equals `total_amount` for every committed sale.
    pub fn details_total(&self) -> Money {
        self.details.iter().map(TransactionDetail::sub_total).sum()
    }
}

/// A line item of a sale.
/// Uses snapshot pattern to freeze the product name at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionDetail {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale × quantity.
    pub sub_total: i64,
}

impl TransactionDetail {
    /// Returns the line subtotal as Money.
    #[inline]
    pub fn sub_total(&self) -> Money {
        Money::from_minor(self.sub_total)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Best-selling product of a report window.
///
/// The empty value (`""`, `0`) means nothing was sold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSold {
    pub name: String,
    pub qty: i64,
}

/// Sales summary over a window. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total_revenue: i64,
    pub total_transaction: i64,
    pub highest_selling: ProductSold,
}

impl Report {
    /// Zero revenue, zero transactions, empty best seller.
    pub fn empty() -> Self {
        Report::default()
    }

    /// Returns the revenue as Money.
    #[inline]
    pub fn revenue(&self) -> Money {
        Money::from_minor(self.total_revenue)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_unit_price() {
        let product = Product {
            id: 1,
            name: "Kopi Susu".to_string(),
            price: 1500,
            stock: 2,
            category_id: None,
            category_name: None,
        };
        assert_eq!(product.unit_price().minor(), 1500);
    }

    #[test]
    fn test_product_patch_fields_only_present() {
        let patch = ProductPatch {
            price: Some(1750),
            category_id: Some(3),
            ..Default::default()
        };
        assert_eq!(
            patch.fields(),
            vec![ProductField::Price(1750), ProductField::CategoryId(3)]
        );
        assert_eq!(patch.fields()[0].column(), "price");
        assert!(!patch.is_empty());
        assert!(ProductPatch::default().is_empty());
        assert!(ProductPatch::default().fields().is_empty());
    }

    #[test]
    fn test_product_patch_validation() {
        let bad = ProductPatch {
            stock: Some(-1),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let blank_name = ProductPatch {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());

        assert!(ProductPatch::default().validate().is_ok());
    }

    #[test]
    fn test_category_patch_from_json() {
        let patch: CategoryPatch = serde_json::from_str(r#"{"description":"Hot drinks"}"#).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.fields(), vec![CategoryField::Description("Hot drinks".to_string())]);
    }

    #[test]
    fn test_transaction_details_total() {
        let detail = |id: i64, sub_total: i64| TransactionDetail {
            id,
            transaction_id: 1,
            product_id: id,
            product_name: format!("P{}", id),
            quantity: 1,
            sub_total,
        };
        let tx = Transaction {
            id: 1,
            total_amount: 4500,
            created_at: Utc::now(),
            details: vec![detail(1, 3000), detail(2, 1500)],
        };
        assert_eq!(tx.details_total(), tx.total());
    }

    #[test]
    fn test_empty_report_shape() {
        let json = serde_json::to_value(Report::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total_revenue": 0,
                "total_transaction": 0,
                "highest_selling": { "name": "", "qty": 0 }
            })
        );
    }

    #[test]
    fn test_checkout_request_from_json() {
        let req: CheckoutRequest =
            serde_json::from_str(r#"{"items":[{"product_id":1,"quantity":2},{"product_id":1,"quantity":1}]}"#)
                .unwrap();
        assert_eq!(req.items, vec![CheckoutItem::new(1, 2), CheckoutItem::new(1, 1)]);
    }
}
