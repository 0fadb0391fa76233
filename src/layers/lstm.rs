use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::activations::functions::sigmoid;
use super::traits::{Module, ParamCount};

/// LSTM (Long Short-Term Memory) cell
///
/// Carries two state slots: the cell state `c` (slot 0) and the hidden
/// state `h` (slot 1). The hidden state is the cell output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmCell {
    pub input_size: usize,
    pub hidden_size: usize,
}

/// Gate weights of an LSTM cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmParams {
    // Input gate
    pub w_ii: Array2<f32>,
    pub w_hi: Array2<f32>,
    pub b_i: Array1<f32>,

    // Forget gate
    pub w_if: Array2<f32>,
    pub w_hf: Array2<f32>,
    pub b_f: Array1<f32>,

    // Cell gate (candidate values)
    pub w_ig: Array2<f32>,
    pub w_hg: Array2<f32>,
    pub b_g: Array1<f32>,

    // Output gate
    pub w_io: Array2<f32>,
    pub w_ho: Array2<f32>,
    pub b_o: Array1<f32>,
}

impl LstmCell {
    pub const N_CARRIES: usize = 2;

    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        LstmCell { input_size, hidden_size }
    }

    /// One recurrent step, returning the new `(c, h)` pair
    pub fn step(
        &self,
        params: &LstmParams,
        x: ArrayView2<f32>,
        c: ArrayView2<f32>,
        h: ArrayView2<f32>,
    ) -> (Array2<f32>, Array2<f32>) {
        assert_eq!(h.ncols(), self.hidden_size, "Hidden state size mismatch");
        assert_eq!(c.ncols(), self.hidden_size, "Cell state size mismatch");

        let i_t = (x.dot(&params.w_ii) + h.dot(&params.w_hi) + &params.b_i).mapv_into(sigmoid);
        let f_t = (x.dot(&params.w_if) + h.dot(&params.w_hf) + &params.b_f).mapv_into(sigmoid);
        let g_t = (x.dot(&params.w_ig) + h.dot(&params.w_hg) + &params.b_g).mapv_into(f32::tanh);
        let o_t = (x.dot(&params.w_io) + h.dot(&params.w_ho) + &params.b_o).mapv_into(sigmoid);

        // c_t = f_t * c + i_t * g_t
        let c_t = &f_t * &c + &i_t * &g_t;
        // h_t = o_t * tanh(c_t)
        let h_t = &o_t * &c_t.mapv(f32::tanh);

        (c_t, h_t)
    }
}

impl Module for LstmCell {
    type Params = LstmParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> LstmParams {
        let (i, h) = (self.input_size, self.hidden_size);
        let input = |rng: &mut R| super::rnn::uniform_kernel((i, h), i + h, rng);
        let hidden = |rng: &mut R| super::rnn::uniform_kernel((h, h), i + h, rng);

        LstmParams {
            w_ii: input(rng),
            w_hi: hidden(rng),
            b_i: Array1::zeros(h),

            w_if: input(rng),
            w_hf: hidden(rng),
            b_f: Array1::ones(h), // forget gate starts open

            w_ig: input(rng),
            w_hg: hidden(rng),
            b_g: Array1::zeros(h),

            w_io: input(rng),
            w_ho: hidden(rng),
            b_o: Array1::zeros(h),
        }
    }
}

impl ParamCount for LstmParams {
    fn num_parameters(&self) -> usize {
        [
            &self.w_ii, &self.w_hi, &self.w_if, &self.w_hf,
            &self.w_ig, &self.w_hg, &self.w_io, &self.w_ho,
        ]
        .iter()
        .map(|w| w.len())
        .sum::<usize>()
            + self.b_i.len()
            + self.b_f.len()
            + self.b_g.len()
            + self.b_o.len()
    }
}
