use serde::{Deserialize, Serialize};

use reorderlab_core::ProductId;

use crate::reorder_rule;

/// One synthetic product row.
///
/// The reorder label is derived from the three numeric fields at
/// construction time and never changes afterwards. Prediction fields are
/// only populated by a training cycle and are always replaced together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    id: ProductId,
    name: String,
    current_inventory: u32,
    avg_sales_per_week: u32,
    days_to_replenish: u32,
    reorder_label: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prediction_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    predicted_label: Option<u8>,
}

impl ProductRecord {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        current_inventory: u32,
        avg_sales_per_week: u32,
        days_to_replenish: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            current_inventory,
            avg_sales_per_week,
            days_to_replenish,
            reorder_label: reorder_rule::reorder_label(
                current_inventory,
                avg_sales_per_week,
                days_to_replenish,
            ),
            prediction_score: None,
            predicted_label: None,
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_inventory(&self) -> u32 {
        self.current_inventory
    }

    pub fn avg_sales_per_week(&self) -> u32 {
        self.avg_sales_per_week
    }

    pub fn days_to_replenish(&self) -> u32 {
        self.days_to_replenish
    }

    /// Ground-truth label from the business rule (`1` = reorder).
    pub fn reorder_label(&self) -> u8 {
        self.reorder_label
    }

    pub fn prediction_score(&self) -> Option<f64> {
        self.prediction_score
    }

    pub fn predicted_label(&self) -> Option<u8> {
        self.predicted_label
    }

    /// Install a model score; the predicted label is `score > 0.5`.
    pub fn set_prediction(&mut self, score: f64) {
        self.prediction_score = Some(score);
        self.predicted_label = Some(u8::from(score > 0.5));
    }

    /// Copy of this record carrying `score`.
    pub fn with_prediction(mut self, score: f64) -> Self {
        self.set_prediction(score);
        self
    }

    /// Feature vector fed to the classifier, in fixed column order.
    pub fn features(&self) -> [f64; 3] {
        [
            f64::from(self.current_inventory),
            f64::from(self.avg_sales_per_week),
            f64::from(self.days_to_replenish),
        ]
    }
}
