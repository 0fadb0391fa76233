use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::functions::sigmoid;
use super::traits::{Module, ParamCount};

/// GRU (Gated Recurrent Unit) cell
///
/// A single recurrent step over a batch of rows. The cell carries one state
/// slot, the hidden state `h`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GruCell {
    /// Input size
    pub input_size: usize,
    /// Hidden size (number of GRU units)
    pub hidden_size: usize,
}

/// Gate weights of a GRU cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GruParams {
    // Reset gate
    pub w_ir: Array2<f32>,
    pub w_hr: Array2<f32>,
    pub b_r: Array1<f32>,

    // Update gate
    pub w_iz: Array2<f32>,
    pub w_hz: Array2<f32>,
    pub b_z: Array1<f32>,

    // New gate (candidate hidden state)
    pub w_in: Array2<f32>,
    pub w_hn: Array2<f32>,
    pub b_n: Array1<f32>,
}

impl GruCell {
    pub const N_CARRIES: usize = 1;

    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        GruCell { input_size, hidden_size }
    }

    /// One recurrent step
    ///
    /// `x` is `(batch, input_size)`, `h` is `(batch, hidden_size)`; returns the
    /// new hidden state, which is also the cell output.
    pub fn step(&self, params: &GruParams, x: ArrayView2<f32>, h: ArrayView2<f32>) -> Array2<f32> {
        assert_eq!(h.ncols(), self.hidden_size, "Hidden state size mismatch");

        // r_t = sigmoid(x W_ir + h W_hr + b_r)
        let r_t = (x.dot(&params.w_ir) + h.dot(&params.w_hr) + &params.b_r).mapv_into(sigmoid);

        // z_t = sigmoid(x W_iz + h W_hz + b_z)
        let z_t = (x.dot(&params.w_iz) + h.dot(&params.w_hz) + &params.b_z).mapv_into(sigmoid);

        // n_t = tanh(x W_in + (r_t * h) W_hn + b_n)
        let n_t = (x.dot(&params.w_in) + (&r_t * &h).dot(&params.w_hn) + &params.b_n)
            .mapv_into(f32::tanh);

        // h_t = (1 - z_t) * n_t + z_t * h
        &(1.0 - &z_t) * &n_t + &z_t * &h
    }
}

impl Module for GruCell {
    type Params = GruParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> GruParams {
        let (i, h) = (self.input_size, self.hidden_size);
        let input = |rng: &mut R| super::rnn::uniform_kernel((i, h), i + h, rng);
        let hidden = |rng: &mut R| super::rnn::uniform_kernel((h, h), i + h, rng);

        GruParams {
            w_ir: input(rng),
            w_hr: hidden(rng),
            b_r: Array1::zeros(h),

            w_iz: input(rng),
            w_hz: hidden(rng),
            b_z: Array1::zeros(h),

            w_in: input(rng),
            w_hn: hidden(rng),
            b_n: Array1::zeros(h),
        }
    }
}

impl ParamCount for GruParams {
    fn num_parameters(&self) -> usize {
        [&self.w_ir, &self.w_hr, &self.w_iz, &self.w_hz, &self.w_in, &self.w_hn]
            .iter()
            .map(|w| w.len())
            .sum::<usize>()
            + self.b_r.len()
            + self.b_z.len()
            + self.b_n.len()
    }
}
