use ndarray::{Array, Dimension};
use serde::{Serialize, Deserialize};

/// An enumeration of the activation functions a layer can apply to its output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Tanh,
}

impl Activation {
    /// Apply the activation function to an array of any shape in-place.
    pub fn apply<D: Dimension>(&self, input: &mut Array<f32, D>) {
        match self {
            Activation::Relu => {
                input.mapv_inplace(|v| v.max(0.0));
            }
            Activation::Linear => {}
            Activation::Tanh => {
                input.mapv_inplace(|v| v.tanh());
            }
        }
    }

    /// Apply the activation function and return the result.
    pub fn applied<D: Dimension>(&self, mut input: Array<f32, D>) -> Array<f32, D> {
        self.apply(&mut input);
        input
    }
}

/// Logistic function used by the recurrent gates
#[inline]
pub(crate) fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}
