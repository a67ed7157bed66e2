//! Strongly-typed identifiers.

use core::num::NonZeroU32;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a synthetic product.
///
/// Ids are positive and assigned in generation order, so `ProductId(1)` is
/// the first record of a generated set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(NonZeroU32);

impl ProductId {
    /// Create an identifier, rejecting zero.
    pub fn new(value: u32) -> Result<Self, DomainError> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or_else(|| DomainError::invalid_id("ProductId: must be positive"))
    }

    /// Identifier for the `index`-th (0-based) generated record.
    pub fn from_index(index: usize) -> Self {
        let value = u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1));
        Self(NonZeroU32::new(value).unwrap_or(NonZeroU32::MAX))
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ProductId> for u32 {
    fn from(value: ProductId) -> Self {
        value.get()
    }
}

impl TryFrom<u32> for ProductId {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|e| DomainError::invalid_id(format!("ProductId: {e}")))?;
        Self::new(value)
    }
}
