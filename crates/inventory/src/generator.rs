//! Deterministic synthetic dataset.
//!
//! Every field is a pure function of the 1-based product index, so the same
//! `count` always yields the same records.

use reorderlab_core::ProductId;

use crate::product::ProductRecord;

/// Size of the dataset a fresh session starts with.
pub const DEFAULT_PRODUCT_COUNT: usize = 150;

const NAMES: [&str; 8] = [
    "Widget", "Gadget", "Sprocket", "Gizmo", "Bracket", "Valve", "Flange", "Coupler",
];

/// Generate `count` products with ids `1..=count`.
pub fn generate(count: usize) -> Vec<ProductRecord> {
    (0..count).map(|index| product_at(ProductId::from_index(index))).collect()
}

fn product_at(id: ProductId) -> ProductRecord {
    let i = id.get();
    let x = f64::from(i);

    let name = format!("{} {}", NAMES[i as usize % NAMES.len()], i);
    let avg_sales_per_week = ((x * 11.0).sin().abs() * 120.0).round().max(1.0) as u32;
    let current_inventory = ((x * 7.0).cos().abs() * 400.0).round().max(0.0) as u32;
    let days_to_replenish = 1 + i % 21;

    ProductRecord::new(id, name, current_inventory, avg_sales_per_week, days_to_replenish)
}
