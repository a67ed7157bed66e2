//! Binary classification loss and metrics.

/// Probabilities are clipped to `[EPSILON, 1 - EPSILON]` before taking logs.
pub const EPSILON: f64 = 1e-7;

/// Decision threshold shared by predictions and accuracy.
pub const THRESHOLD: f64 = 0.5;

/// Binary cross-entropy for one prediction.
pub fn binary_cross_entropy(prediction: f64, label: f64) -> f64 {
    let p = prediction.clamp(EPSILON, 1.0 - EPSILON);
    -(label * p.ln() + (1.0 - label) * (1.0 - p).ln())
}

/// Gradient of [`binary_cross_entropy`] w.r.t. the logit of a sigmoid output.
pub fn sigmoid_bce_delta(prediction: f64, label: f64) -> f64 {
    prediction - label
}

/// Whether a prediction lands on the same side of the threshold as `label`.
pub fn is_correct(prediction: f64, label: f64) -> bool {
    (prediction > THRESHOLD) == (label > THRESHOLD)
}

/// Mean loss and accuracy of `(prediction, label)` pairs.
///
/// Returns `None` for an empty input.
pub fn evaluate(pairs: impl IntoIterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    let mut n = 0usize;
    let mut loss = 0.0;
    let mut correct = 0usize;
    for (prediction, label) in pairs {
        n += 1;
        loss += binary_cross_entropy(prediction, label);
        if is_correct(prediction, label) {
            correct += 1;
        }
    }
    (n > 0).then(|| (loss / n as f64, correct as f64 / n as f64))
}
