//! Activation function types.

use serde::{Deserialize, Serialize};

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Activator {
    /// Passes the input through unchanged.
    Identity,
    /// Rectified Linear Unit
    ReLU,
    /// Leaky Rectified Linear Unit
    ///
    /// Takes an `alpha` value to use for negative inputs.
    LeakyReLU(f64),
    /// Sigmoid function, squashes into `(0, 1)`.
    Sigmoid,
    /// Hyperbolic tan function
    TanH,
}

impl Activator {
    /// Evaluates `f(x)` for the selected activation function.
    pub fn f(&self, x: f64) -> f64 {
        match *self {
            Activator::Identity => x,
            Activator::ReLU => x.max(0.0),
            Activator::LeakyReLU(alpha) => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            Activator::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activator::TanH => x.tanh(),
        }
    }

    /// Evaluates the derivative `f'(x)`, where `x = f^{-1}(y)`.
    ///
    /// Takes the *output* of the activation function rather than its input,
    /// so layers never need to keep pre-activation values around.
    pub fn fprime(&self, y: f64) -> f64 {
        match *self {
            Activator::Identity => 1.0,
            Activator::ReLU => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activator::LeakyReLU(alpha) => {
                if y > 0.0 {
                    1.0
                } else {
                    alpha
                }
            }
            Activator::Sigmoid => y * (1.0 - y),
            Activator::TanH => 1.0 - y * y,
        }
    }
}
