//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures (not found, stock)      │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - Caller-facing classification                   │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  ├── DbError          - Store failures                                 │
//! │  └── ServiceError     - CoreError | DbError, classified by ErrorKind   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → transport response │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// How a caller should treat a failure.
///
/// ## Mapping To Responses
/// ```text
/// Validation    → 400, fix the input
/// NotFound      → 404, no retry
/// BusinessRule  → 409/422, resubmit with adjusted quantities
/// Transient     → 503, safe to retry the whole call (it is atomic)
/// Fatal         → 500, no retry
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing input. No store access was attempted.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// A business rule rejected the request (insufficient stock).
    BusinessRule,
    /// Connectivity, lock contention or an expired deadline.
    Transient,
    /// Anything else: constraint violations, programming errors.
    Fatal,
}

impl ErrorKind {
    /// Whether the whole operation may be retried from scratch.
    #[inline]
    pub const fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Insufficient stock to complete a checkout line.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout [{product: 2, qty: 100}]
    ///      │
    ///      ▼
    /// Guarded decrement fails: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 2, available: 5, requested: 100 }
    ///      │
    ///      ▼
    /// Whole checkout rolled back, caller resubmits
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A monetary amount left the representable range.
    #[error("Amount overflow while computing {context}")]
    AmountOverflow { context: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Classifies this error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::ProductNotFound(_) => ErrorKind::NotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::BusinessRule,
            CoreError::AmountOverflow { .. } | CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 3, requested 5"
        );
        assert_eq!(CoreError::ProductNotFound(42).to_string(), "Product not found: 42");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(CoreError::ProductNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::InsufficientStock {
                product_id: 1,
                available: 0,
                requested: 1
            }
            .kind(),
            ErrorKind::BusinessRule
        );

        let validation: CoreError = ValidationError::Required {
            field: "items".to_string(),
        }
        .into();
        assert!(matches!(validation, CoreError::Validation(_)));
        assert_eq!(validation.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(ErrorKind::Transient.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::NotFound.is_retryable());
        assert!(!ErrorKind::BusinessRule.is_retryable());
        assert!(!ErrorKind::Fatal.is_retryable());
    }

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::BusinessRule).unwrap();
        assert_eq!(json, "\"BUSINESS_RULE\"");
    }
}
