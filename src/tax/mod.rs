//! Tax calculation

pub mod cascade;

pub use cascade::*;
