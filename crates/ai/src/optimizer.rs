//! Gradient-based parameter updates.

use ndarray::{Array, Array1, Array2, Dimension, Zip};

use crate::layer::{Dense, Gradients};

/// Applies averaged gradients to a stack of layers.
pub trait Optimizer {
    /// Updates `layers` in place; `gradients[i]` belongs to `layers[i]`.
    fn step(&mut self, layers: &mut [Dense], gradients: &[Gradients]);
}

/// First and second moment estimates for one layer.
#[derive(Debug, Clone)]
struct Moments {
    m_weights: Array2<f64>,
    v_weights: Array2<f64>,
    m_biases: Array1<f64>,
    v_biases: Array1<f64>,
}

impl Moments {
    fn zeros_like(gradients: &Gradients) -> Self {
        Moments {
            m_weights: Array2::zeros(gradients.weights.raw_dim()),
            v_weights: Array2::zeros(gradients.weights.raw_dim()),
            m_biases: Array1::zeros(gradients.biases.raw_dim()),
            v_biases: Array1::zeros(gradients.biases.raw_dim()),
        }
    }
}

/// Hyper-parameters of a single update, with the bias correction folded
/// into the step size.
#[derive(Debug, Copy, Clone)]
struct Update {
    step_size: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
}

impl Update {
    fn apply<D: Dimension>(
        &self,
        params: &mut Array<f64, D>,
        grads: &Array<f64, D>,
        m: &mut Array<f64, D>,
        v: &mut Array<f64, D>,
    ) {
        let Update {
            step_size,
            beta1,
            beta2,
            epsilon,
        } = *self;
        Zip::from(params)
            .and(grads)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *p -= step_size * *m / (v.sqrt() + epsilon);
            });
    }
}

/// [Adam](https://arxiv.org/abs/1412.6980) with bias-corrected moments.
///
/// Moment buffers are sized lazily on the first step, so one optimizer
/// belongs to exactly one network.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
    moments: Vec<Moments>,
}

impl Adam {
    pub const DEFAULT_BETA1: f64 = 0.9;
    pub const DEFAULT_BETA2: f64 = 0.999;
    pub const DEFAULT_EPSILON: f64 = 1e-7;

    pub fn new(learning_rate: f64) -> Self {
        Adam {
            learning_rate,
            beta1: Self::DEFAULT_BETA1,
            beta2: Self::DEFAULT_BETA2,
            epsilon: Self::DEFAULT_EPSILON,
            t: 0,
            moments: Vec::new(),
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [Dense], gradients: &[Gradients]) {
        if self.moments.len() != gradients.len() {
            self.moments = gradients.iter().map(Moments::zeros_like).collect();
        }

        self.t += 1;
        let update = Update {
            step_size: self.learning_rate * (1.0 - self.beta2.powi(self.t)).sqrt()
                / (1.0 - self.beta1.powi(self.t)),
            beta1: self.beta1,
            beta2: self.beta2,
            epsilon: self.epsilon,
        };

        for ((layer, grads), moments) in layers.iter_mut().zip(gradients).zip(&mut self.moments) {
            let (weights, biases) = layer.parameters_mut();
            update.apply(weights, &grads.weights, &mut moments.m_weights, &mut moments.v_weights);
            update.apply(biases, &grads.biases, &mut moments.m_biases, &mut moments.v_biases);
        }
    }
}
