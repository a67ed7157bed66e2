//! Inventory domain module.
//!
//! This crate contains the synthetic product records and the reorder business
//! rule, implemented purely as deterministic logic (no IO, no randomness).

pub mod generator;
pub mod product;
pub mod reorder_rule;

pub use generator::{generate, DEFAULT_PRODUCT_COUNT};
pub use product::ProductRecord;
pub use reorder_rule::{expected_during_lead, needs_reorder, reorder_label};
