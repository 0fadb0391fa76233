use ndarray::{Array2, ArrayView2};
use rand::Rng;

/// A network definition whose trainable state lives outside of it.
///
/// Implementors only describe sizes and sub-modules; `init_params` produces a
/// fresh parameter tree that every forward call borrows.
pub trait Module: Send + Sync {
    /// Parameter tree of this module
    type Params: Clone + Send + Sync;

    /// Draw a fresh set of parameters from `rng`
    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Params;
}

/// A module mapping a `(batch, input_size)` feature matrix to `(batch, output_size)`.
pub trait FeatureModule: Module {
    /// Apply the module to a batch of feature rows
    fn apply(&self, params: &Self::Params, inputs: ArrayView2<f32>) -> Array2<f32>;

    /// Get the input size of the module
    fn input_size(&self) -> usize;

    /// Get the output size of the module
    fn output_size(&self) -> usize;
}

/// Number of scalar parameters held by a parameter tree
pub trait ParamCount {
    fn num_parameters(&self) -> usize;
}

impl<P: ParamCount> ParamCount for Option<P> {
    fn num_parameters(&self) -> usize {
        self.as_ref().map_or(0, ParamCount::num_parameters)
    }
}

impl<P: ParamCount> ParamCount for Vec<P> {
    fn num_parameters(&self) -> usize {
        self.iter().map(ParamCount::num_parameters).sum()
    }
}
