//! # Invoice Posting
//!
//! Turns submitted sales and purchase invoices into balanced double-entry
//! ledger lines, and reverses them on cancellation.
//!
//! ## Features
//!
//! - **Discount resolution**: percentage or fixed amount, with the amount taking precedence
//! - **Tax cascade**: rows on net total, on the previous row's running total, or fixed amounts
//! - **Ledger building**: sales and purchase invoices posted through a configurable chart of accounts
//! - **Reversal**: mirrored lines for cancellation, verified to net every account to zero
//! - **Storage abstraction**: the posting service writes through the async `LedgerStore` trait
//!
//! ## Quick Start
//!
//! ```rust
//! use invoice_posting::{DiscountResult, LedgerBuilder, SalesInvoice, TaxRule, TaxResult};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let subtotal = BigDecimal::from(1_000_000);
//! let discount = DiscountResult::resolve(&subtotal, Some(&BigDecimal::from(10)), None).unwrap();
//! let vat = TaxRule::on_net_total("2210 - Hutang PPN", "PPN 11%", BigDecimal::from(11));
//! let taxes = TaxResult::apply(&discount.net_total, &[vat]).unwrap();
//!
//! let invoice = SalesInvoice::assemble(
//!     "SI-2024-00001",
//!     "CUST-001",
//!     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     &subtotal,
//!     &discount,
//!     &taxes,
//! );
//!
//! let set = LedgerBuilder::default().build_sales(&invoice, None).unwrap();
//! assert!(set.is_balanced);
//! ```

pub mod config;
pub mod discount;
pub mod ledger;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{AccountMapping, PostingConfig};
pub use discount::*;
pub use ledger::*;
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStore;
