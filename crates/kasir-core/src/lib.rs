//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! Domain types and rules shared by every layer of the Kasir backend.
//! Nothing in here touches a database, a socket or the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Transport (HTTP handlers, seed binary, ...)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │      Checkout engine, reporting engine, catalog repositories    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Window   │  │   rules   │  │   │
//! │  │   │Transaction│  │           │  │SalesTally │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog and ledger types (Product, Transaction, Report, ...)
//! - [`money`] - Money type over integer minor units
//! - [`error`] - Domain error types and the error taxonomy
//! - [`validation`] - Input validation
//! - [`report`] - Report windows and best-seller aggregation
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::money::Money;
//!
//! let unit_price = Money::from_minor(1500);
//! let subtotal = unit_price.checked_mul_quantity(2).unwrap();
//! assert_eq!(subtotal.minor(), 3000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use report::{ReportWindow, SalesTally};
pub use types::*;

/// Date format accepted by range reports (`YYYY-MM-DD`).
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";
