use ndarray::{Array2, ArrayView2};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::Activation;
use super::dense::{Dense, DenseParams};
use super::traits::{FeatureModule, Module, ParamCount};

/// Multi-layer perceptron: a stack of dense layers sharing one hidden activation
///
/// The last layer uses the hidden activation only when `act_final` is set,
/// otherwise it is linear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    layers: Vec<Dense>,
    pub act: Activation,
    pub act_final: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpParams {
    pub layers: Vec<DenseParams>,
}

impl Mlp {
    /// Create an MLP mapping `input_size` features through `hid_sizes`
    ///
    /// # Panics
    /// When `hid_sizes` is empty.
    pub fn new(input_size: usize, hid_sizes: &[usize], act: Activation, act_final: bool) -> Self {
        assert!(!hid_sizes.is_empty(), "MLP needs at least one layer");

        let mut layers = Vec::with_capacity(hid_sizes.len());
        let mut fan_in = input_size;
        for (i, &size) in hid_sizes.iter().enumerate() {
            let is_last = i == hid_sizes.len() - 1;
            let activation = if is_last && !act_final { Activation::Linear } else { act };
            layers.push(Dense::new(fan_in, size, activation));
            fan_in = size;
        }

        Mlp { layers, act, act_final }
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }
}

impl Module for Mlp {
    type Params = MlpParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> MlpParams {
        MlpParams {
            layers: self.layers.iter().map(|l| l.init_params(rng)).collect(),
        }
    }
}

impl FeatureModule for Mlp {
    fn apply(&self, params: &MlpParams, inputs: ArrayView2<f32>) -> Array2<f32> {
        assert_eq!(params.layers.len(), self.layers.len(), "MLP parameter tree has wrong depth");

        let mut x = inputs.to_owned();
        for (layer, layer_params) in self.layers.iter().zip(&params.layers) {
            x = layer.apply(layer_params, x.view());
        }
        x
    }

    fn input_size(&self) -> usize {
        self.layers[0].input_size
    }

    fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size
    }
}

impl ParamCount for MlpParams {
    fn num_parameters(&self) -> usize {
        self.layers.num_parameters()
    }
}
