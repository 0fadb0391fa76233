use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::Activation;
use super::initialization::WeightInit;
use super::traits::{FeatureModule, Module, ParamCount};

/// A fully connected (dense) layer definition: `act(x W + b)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub input_size: usize,
    pub output_size: usize,
    pub activation: Activation,
    pub init: WeightInit,
}

/// Kernel and bias of a dense layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseParams {
    pub kernel: Array2<f32>,
    pub bias: Array1<f32>,
}

impl Dense {
    /// Create a new dense layer with zero biases and kernels initialized for
    /// `activation` (He for ReLU, Xavier otherwise).
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Dense {
            input_size,
            output_size,
            activation,
            init: WeightInit::for_activation(&activation),
        }
    }

    /// A dense layer without activation
    pub fn linear(input_size: usize, output_size: usize) -> Self {
        Self::new(input_size, output_size, Activation::Linear)
    }
}

impl Module for Dense {
    type Params = DenseParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> DenseParams {
        DenseParams {
            kernel: self.init.initialize_weights((self.input_size, self.output_size), rng),
            bias: self.init.initialize_biases(self.output_size),
        }
    }
}

impl FeatureModule for Dense {
    fn apply(&self, params: &DenseParams, inputs: ArrayView2<f32>) -> Array2<f32> {
        assert_eq!(
            inputs.ncols(),
            self.input_size,
            "Dense layer expects {} input features, got {}",
            self.input_size,
            inputs.ncols()
        );
        let outputs = inputs.dot(&params.kernel) + &params.bias.view().insert_axis(Axis(0));
        self.activation.applied(outputs)
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }
}

impl ParamCount for DenseParams {
    fn num_parameters(&self) -> usize {
        self.kernel.len() + self.bias.len()
    }
}
