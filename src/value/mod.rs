//! # Value Functions
//!
//! Graph value functions for multi-agent training, from leaves to facade:
//!
//! - [`latent`]: latent-code encoder and the generic latent wrapper
//! - [`StateFn`]: centralized, non-recurrent team value
//! - [`RStateFn`]: centralized team value with optional recurrence and latent conditioning
//! - [`DecRStateFn`]: per-agent (decomposed) value with optional global context
//! - [`ValueNet`]: assembles one of the above from a flat [`ValueNetConfig`]
//!
//! Every function is a definition only. Parameters come from `init_params`
//! and are borrowed by each call; recurrent state is returned, never kept.

pub mod latent;
pub mod state_fn;
pub mod recurrent;
pub mod decomposed;
pub mod params;
pub mod net;

pub use latent::{LatentEncoder, LatentWrapper, LatentWrapperParams};
pub use state_fn::{StateFn, StateFnParams};
pub use recurrent::RStateFn;
pub use decomposed::DecRStateFn;
pub use params::ValueFnParams;
pub use net::{ValueNet, ValueNetConfig};

use ndarray::{s, Array2, Array4, ArrayD, ArrayView2, ArrayViewD, Axis, IxDyn};

/// Mean over rows, keeping a leading singleton axis: `(n, d) -> (1, d)`
pub(crate) fn mean_pool(x: ArrayView2<f32>) -> Array2<f32> {
    assert!(x.nrows() > 0, "Cannot pool an empty set of agents");
    (x.sum_axis(Axis(0)) / x.nrows() as f32).insert_axis(Axis(0))
}

/// Concatenate two row-aligned feature matrices along the feature axis
pub(crate) fn hstack(left: ArrayView2<f32>, right: ArrayView2<f32>) -> Array2<f32> {
    assert_eq!(left.nrows(), right.nrows(), "Feature blocks have different row counts");
    let split = left.ncols();
    let mut out = Array2::zeros((left.nrows(), split + right.ncols()));
    out.slice_mut(s![.., ..split]).assign(&left);
    out.slice_mut(s![.., split..]).assign(&right);
    out
}

/// Check a caller-held recurrent state and view it as an RNN carry
pub(crate) fn to_carry(state: &ArrayViewD<f32>, expected: &[usize], carry_shape: (usize, usize, usize, usize)) -> Array4<f32> {
    assert_eq!(
        state.shape(),
        expected,
        "Recurrent state has shape {:?}, expected {:?}",
        state.shape(),
        expected
    );
    state
        .to_shape(carry_shape)
        .expect("Carry holds the same element count as the state")
        .into_owned()
}

/// Reshape an RNN carry back to the caller-facing recurrent state shape
pub(crate) fn from_carry(carry: Array4<f32>, shape: &[usize]) -> ArrayD<f32> {
    carry
        .into_shape(IxDyn(shape))
        .expect("Recurrent state holds the same element count as the carry")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_pool_keeps_singleton() {
        let x = array![[1.0, 2.0], [3.0, 6.0]];
        assert_eq!(mean_pool(x.view()), array![[2.0, 4.0]]);
    }

    #[test]
    fn test_hstack() {
        let a = array![[1.0], [2.0]];
        let b = array![[3.0, 4.0], [5.0, 6.0]];
        assert_eq!(hstack(a.view(), b.view()), array![[1.0, 3.0, 4.0], [2.0, 5.0, 6.0]]);
    }
}
