use ndarray::{Array1, Array2, Axis, Zip};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activator::Activator;

/// A fully connected layer of a neural network.
///
/// `weights` has one row per output neuron, so `weights[[o, i]]` connects
/// input `i` to output `o`. Inputs are processed a minibatch at a time, one
/// row per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    /// The activation function to be used for every neuron in the layer.
    activator: Activator,
    weights: Array2<f64>,
    biases: Array1<f64>,
}

/// Gradients of the loss w.r.t. one `Dense` layer's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
}

impl Dense {
    /// Initializes a new, untrained layer.
    ///
    /// Weights are drawn from a Glorot-uniform distribution, biases start at
    /// zero.
    ///
    /// Arguments:
    ///
    ///  * `activator` - the activation function to be used for this layer's
    ///                  output.
    ///  * `inputs` - the number of inputs to this layer.
    ///  * `outputs` - the number of outputs from this layer.
    pub fn new<R: Rng + ?Sized>(activator: Activator, inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let dist = Uniform::new_inclusive(-limit, limit);
        let weights = Array2::from_shape_simple_fn((outputs, inputs), || dist.sample(rng));
        Self::from_parameters(activator, weights, Array1::zeros(outputs))
    }

    /// Builds a layer from explicit parameters.
    ///
    /// Panics if `biases` does not have one entry per row of `weights`.
    pub fn from_parameters(activator: Activator, weights: Array2<f64>, biases: Array1<f64>) -> Self {
        assert_eq!(weights.nrows(), biases.len(), "one bias per output neuron");
        Dense {
            activator,
            weights,
            biases,
        }
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    /// Returns the number of inputs to this layer.
    pub fn input_len(&self) -> usize {
        self.weights.ncols()
    }

    /// Returns the number of outputs from this layer.
    pub fn output_len(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f64> {
        &self.biases
    }

    pub(crate) fn parameters_mut(&mut self) -> (&mut Array2<f64>, &mut Array1<f64>) {
        (&mut self.weights, &mut self.biases)
    }

    /// Feeds a `(batch, inputs)` matrix forward, returning the activated
    /// `(batch, outputs)` matrix.
    pub fn forward(&self, inputs: &Array2<f64>) -> Array2<f64> {
        let mut z = inputs.dot(&self.weights.t());
        z += &self.biases;
        let activator = self.activator;
        z.mapv_inplace(|x| activator.f(x));
        z
    }

    /// Converts gradients w.r.t. this layer's outputs into gradients w.r.t.
    /// its pre-activation values, in place.
    pub fn activation_delta(&self, outputs: &Array2<f64>, output_errors: &mut Array2<f64>) {
        let activator = self.activator;
        Zip::from(output_errors)
            .and(outputs)
            .for_each(|e, &y| *e *= activator.fprime(y));
    }

    /// Feeds a pre-activation `delta` backwards through the layer.
    ///
    /// Returns the gradient w.r.t. this layer's inputs and the parameter
    /// gradients summed over the batch rows.
    pub fn backward(&self, inputs: &Array2<f64>, delta: &Array2<f64>) -> (Array2<f64>, Gradients) {
        let gradients = Gradients {
            weights: delta.t().dot(inputs),
            biases: delta.sum_axis(Axis(0)),
        };
        (delta.dot(&self.weights), gradients)
    }
}
