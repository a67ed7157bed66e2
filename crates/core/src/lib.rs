//! `reorderlab-core`: shared building blocks.
//!
//! This crate contains **pure** primitives (no IO, no numerics) used by the
//! inventory generator, the classifier and the session layer.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::ProductId;
