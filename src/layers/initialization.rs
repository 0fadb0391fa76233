use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::Activation;

/// Weight initialization strategies
///
/// Every strategy draws from a caller-supplied RNG so that a parameter tree
/// initialized from the same seed is bit-for-bit identical. Biases start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeightInit {
    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::XavierUniform
    }
}

impl WeightInit {
    /// Get the recommended initialization for an activation function
    pub fn for_activation(activation: &Activation) -> Self {
        match activation {
            Activation::Relu => WeightInit::HeUniform,
            Activation::Tanh | Activation::Linear => WeightInit::XavierUniform,
        }
    }

    /// Initialize a `(fan_in, fan_out)` kernel
    ///
    /// Empty fans count as one, so zero-width layers (edge encoders of graphs
    /// without edge features) still get a finite range.
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        let limit = match *self {
            WeightInit::XavierUniform => (6.0 / (fan_in + fan_out).max(1) as f32).sqrt(),
            WeightInit::HeUniform => (6.0 / fan_in.max(1) as f32).sqrt(),
        };
        Array2::random_using(shape, Uniform::new_inclusive(-limit, limit), rng)
    }

    pub fn initialize_biases(&self, size: usize) -> Array1<f32> {
        Array1::zeros(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_xavier_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        let w = WeightInit::XavierUniform.initialize_weights((10, 20), &mut rng);
        let limit = (6.0 / 30.0_f32).sqrt();
        assert!(w.iter().all(|&v| v >= -limit && v <= limit));
    }

    #[test]
    fn test_he_uniform_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        let w = WeightInit::HeUniform.initialize_weights((6, 40), &mut rng);
        assert!(w.iter().all(|&v| v.abs() <= 1.0));
        assert!(w.iter().any(|&v| v.abs() > (6.0 / 46.0_f32).sqrt()));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = WeightInit::HeUniform.initialize_weights((8, 4), &mut StdRng::seed_from_u64(7));
        let b = WeightInit::HeUniform.initialize_weights((8, 4), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_fan_in_is_finite() {
        let w = WeightInit::HeUniform.initialize_weights((0, 3), &mut StdRng::seed_from_u64(0));
        assert_eq!(w.dim(), (0, 3));
    }

    #[test]
    fn test_init_follows_activation() {
        assert_eq!(WeightInit::for_activation(&Activation::Relu), WeightInit::HeUniform);
        assert_eq!(WeightInit::for_activation(&Activation::Tanh), WeightInit::XavierUniform);
        assert_eq!(WeightInit::for_activation(&Activation::Linear), WeightInit::XavierUniform);
    }
}
