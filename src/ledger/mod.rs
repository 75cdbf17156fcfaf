//! Ledger module: invoice posting, reversal and the posting service

pub mod builder;
pub mod purchase;
pub mod reversal;
pub mod sales;
pub mod service;

pub use builder::LedgerBuilder;
pub use purchase::*;
pub use reversal::*;
pub use sales::*;
pub use service::*;
