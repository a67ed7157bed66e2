//! The hand-written reorder rule used as ground truth.
//!
//! A product needs reordering when the stock on hand will not cover the
//! projected sales during the replenishment lead time, padded by a safety
//! factor.

/// Multiplier applied to the projected lead-time demand.
pub const SAFETY_FACTOR: f64 = 1.25;

/// Lead time is expressed in days, sales in weeks.
pub const DAYS_PER_WEEK: f64 = 7.0;

/// Units expected to sell while a reorder is in transit.
pub fn expected_during_lead(avg_sales_per_week: u32, days_to_replenish: u32) -> f64 {
    f64::from(avg_sales_per_week) * (f64::from(days_to_replenish) / DAYS_PER_WEEK)
}

/// Returns `true` when the rule flags the product for reorder.
pub fn needs_reorder(current_inventory: u32, avg_sales_per_week: u32, days_to_replenish: u32) -> bool {
    f64::from(current_inventory)
        < expected_during_lead(avg_sales_per_week, days_to_replenish) * SAFETY_FACTOR
}

/// Binary form of [`needs_reorder`] (`1` = reorder).
pub fn reorder_label(current_inventory: u32, avg_sales_per_week: u32, days_to_replenish: u32) -> u8 {
    u8::from(needs_reorder(current_inventory, avg_sales_per_week, days_to_replenish))
}
