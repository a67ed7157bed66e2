//! Rule-vs-model comparison over a product table.

use serde::Serialize;

use reorderlab_core::ProductId;
use reorderlab_inventory::ProductRecord;

/// Confusion counts treating the business rule as ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub model_reorders: usize,
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
    /// Fraction of products where model and rule agree.
    pub agreement: f64,
    /// Products where model and rule disagree, in table order.
    pub disagreements: Vec<ProductId>,
}

/// Read model for the dashboard: disposable and rebuilt from the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total: usize,
    pub rule_reorders: usize,
    /// `None` until every product carries a prediction.
    pub model: Option<ModelComparison>,
}

impl Dashboard {
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let rule_reorders = records.iter().filter(|r| r.reorder_label() == 1).count();
        let scored = !records.is_empty() && records.iter().all(|r| r.predicted_label().is_some());

        Dashboard {
            total: records.len(),
            rule_reorders,
            model: scored.then(|| compare(records)),
        }
    }

    pub fn model_reorders(&self) -> Option<usize> {
        self.model.as_ref().map(|m| m.model_reorders)
    }

    pub fn agreement(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.agreement)
    }

    pub fn disagreements(&self) -> &[ProductId] {
        self.model.as_ref().map_or(&[][..], |m| m.disagreements.as_slice())
    }
}

fn compare(records: &[ProductRecord]) -> ModelComparison {
    let mut c = ModelComparison {
        model_reorders: 0,
        true_positive: 0,
        false_positive: 0,
        true_negative: 0,
        false_negative: 0,
        agreement: 0.0,
        disagreements: Vec::new(),
    };

    for r in records {
        let rule = r.reorder_label() == 1;
        let model = r.predicted_label() == Some(1);
        match (rule, model) {
            (true, true) => c.true_positive += 1,
            (false, true) => c.false_positive += 1,
            (false, false) => c.true_negative += 1,
            (true, false) => c.false_negative += 1,
        }
        if rule != model {
            c.disagreements.push(r.id());
        }
    }

    c.model_reorders = c.true_positive + c.false_positive;
    c.agreement = (c.true_positive + c.true_negative) as f64 / records.len() as f64;
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use reorderlab_inventory::generate;

    #[test]
    fn untrained_table_has_no_model_view() {
        let d = Dashboard::from_records(&generate(150));
        assert_eq!(d.total, 150);
        assert_eq!(d.rule_reorders, 36);
        assert!(d.model.is_none());
        assert_eq!(d.model_reorders(), None);
        assert_eq!(d.agreement(), None);
        assert!(d.disagreements().is_empty());
    }

    #[test]
    fn empty_table() {
        let d = Dashboard::from_records(&[]);
        assert_eq!(d.total, 0);
        assert!(d.model.is_none());
    }

    #[test]
    fn confusion_counts_follow_rule_as_truth() {
        // Predict "reorder" for every product: all positives are hits, all
        // negatives false alarms.
        let records: Vec<_> = generate(150).into_iter().map(|r| r.with_prediction(0.9)).collect();
        let d = Dashboard::from_records(&records);
        let m = d.model.as_ref().unwrap();
        assert_eq!(m.true_positive, 36);
        assert_eq!(m.false_positive, 114);
        assert_eq!(m.true_negative, 0);
        assert_eq!(m.false_negative, 0);
        assert_eq!(d.model_reorders(), Some(150));
        assert_eq!(d.agreement(), Some(36.0 / 150.0));
        assert_eq!(d.disagreements().len(), 114);
    }

    #[test]
    fn partially_scored_table_is_treated_as_untrained() {
        let mut records = generate(3);
        records[0].set_prediction(0.1);
        assert!(Dashboard::from_records(&records).model.is_none());
    }
}
