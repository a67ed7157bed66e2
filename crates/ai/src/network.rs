//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network) built from
//! stacked dense layers.

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activator::Activator;
use crate::layer::{Dense, Gradients};
use crate::result::AiError;

/// Width and activation of one dense layer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub units: usize,
    pub activator: Activator,
}

impl LayerSpec {
    pub fn new(units: usize, activator: Activator) -> Self {
        Self { units, activator }
    }
}

/// A non-empty stack of dense layers evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new, untrained network.
    ///
    /// Arguments:
    ///  * `input_len` - the number of features fed to the first layer.
    ///  * `specs` - one entry per layer, the last one being the output layer.
    pub fn new<R: Rng + ?Sized>(input_len: usize, specs: &[LayerSpec], rng: &mut R) -> Result<Self, AiError> {
        if input_len == 0 {
            return Err(AiError::invalid_input("network needs at least one input"));
        }
        if specs.iter().any(|s| s.units == 0) {
            return Err(AiError::invalid_input("layers must have at least one unit"));
        }

        let mut layers = Vec::with_capacity(specs.len());
        let mut inputs = input_len;
        for spec in specs {
            layers.push(Dense::new(spec.activator, inputs, spec.units, rng));
            inputs = spec.units;
        }
        Self::from_layers(layers)
    }

    /// Wraps pre-built layers, checking that their shapes chain.
    pub fn from_layers(layers: Vec<Dense>) -> Result<Self, AiError> {
        if layers.is_empty() {
            return Err(AiError::invalid_input("network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_len() != pair[1].input_len() {
                return Err(AiError::invalid_input(format!(
                    "layer output {} does not match next layer input {}",
                    pair[0].output_len(),
                    pair[1].input_len()
                )));
            }
        }
        Ok(Sequential { layers })
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.layers[0].input_len()
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.layers[self.layers.len() - 1].output_len()
    }

    pub fn output_activator(&self) -> Activator {
        self.layers[self.layers.len() - 1].activator()
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Dense] {
        &mut self.layers
    }

    /// Feeds a `(batch, input_len)` matrix through the network, returning
    /// the `(batch, output_len)` output layer.
    pub fn predict(&self, inputs: &Array2<f64>) -> Array2<f64> {
        self.layers
            .iter()
            .fold(inputs.to_owned(), |x, layer| layer.forward(&x))
    }

    /// Returns the activated values at every layer boundary, input first and
    /// output last.
    pub(crate) fn feed_forward(&self, inputs: &Array2<f64>) -> Vec<Array2<f64>> {
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(inputs.to_owned());
        for (i, layer) in self.layers.iter().enumerate() {
            let next = layer.forward(&activations[i]);
            activations.push(next);
        }
        activations
    }

    /// Back-propagates `output_delta` through the activations recorded by
    /// [`feed_forward`](Self::feed_forward), returning one set of gradients
    /// per layer.
    ///
    /// `output_delta` is the loss gradient w.r.t. the output layer's
    /// *pre-activation* values, which for a sigmoid output under binary
    /// cross-entropy is simply `prediction - label`.
    pub(crate) fn feed_backward(&self, activations: &[Array2<f64>], output_delta: Array2<f64>) -> Vec<Gradients> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut delta = output_delta;
        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (input_errors, grads) = layer.backward(&activations[i], &delta);
            gradients.push(grads);
            if i > 0 {
                delta = input_errors;
                self.layers[i - 1].activation_delta(&activations[i], &mut delta);
            }
        }
        gradients.reverse();
        gradients
    }
}
