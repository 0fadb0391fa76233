//! # Activation Functions Module
//!
//! Elementwise non-linearities used by the dense layers, the MLP heads and the
//! graph transformer.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)`, the default for hidden layers and value heads
//! - **Tanh**: hyperbolic tangent, bounds latent embeddings to `[-1, 1]`
//! - **Linear**: identity, used for final value projections
//!
//! The recurrent cells gate with a logistic sigmoid applied directly, not
//! through this enum.
//!
//! ## Usage Example
//!
//! ```rust
//! use phalanx::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5], [0.0, 2.0]];
//! Activation::Relu.apply(&mut data);
//! assert_eq!(data, array![[1.0, 0.0], [0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
