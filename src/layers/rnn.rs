use ndarray::{s, Array2, Array4, ArrayView2, ArrayView4};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Serialize, Deserialize};
use super::gru::{GruCell, GruParams};
use super::lstm::{LstmCell, LstmParams};
use super::traits::{Module, ParamCount};

/// Which recurrent cell an [`Rnn`] stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Gru,
    Lstm,
}

impl CellKind {
    /// Kind of cell a parameter set belongs to
    pub fn of(params: &CellParams) -> Self {
        match params {
            CellParams::Gru(_) => CellKind::Gru,
            CellParams::Lstm(_) => CellKind::Lstm,
        }
    }

    /// Number of state slots the cell carries
    pub fn n_carries(&self) -> usize {
        match self {
            CellKind::Gru => GruCell::N_CARRIES,
            CellKind::Lstm => LstmCell::N_CARRIES,
        }
    }
}

/// A stack of `n_layers` recurrent cells of one kind
///
/// The carry has shape `(rows, n_layers, n_carries, hidden_size)`; every row
/// is an independent sequence (the team, or one agent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rnn {
    pub kind: CellKind,
    pub input_size: usize,
    pub hidden_size: usize,
    pub n_layers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellParams {
    Gru(GruParams),
    Lstm(LstmParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RnnParams {
    pub layers: Vec<CellParams>,
}

impl Rnn {
    pub fn new(kind: CellKind, input_size: usize, hidden_size: usize, n_layers: usize) -> Self {
        Rnn { kind, input_size, hidden_size, n_layers }
    }

    /// Shape of the carry for `rows` independent sequences
    pub fn carry_shape(&self, rows: usize) -> (usize, usize, usize, usize) {
        (rows, self.n_layers, self.kind.n_carries(), self.hidden_size)
    }

    /// Zero-valued carry for `rows` independent sequences
    pub fn initialize_carry(&self, rows: usize) -> Array4<f32> {
        Array4::zeros(self.carry_shape(rows))
    }

    fn layer_input_size(&self, layer: usize) -> usize {
        if layer == 0 { self.input_size } else { self.hidden_size }
    }

    /// Advance every layer by one step
    ///
    /// `x` is `(rows, input_size)` and `carry` is `(rows, n_layers, n_carries, hidden)`.
    /// Returns the top layer output `(rows, hidden)` and the new carry.
    pub fn apply(&self, params: &RnnParams, x: ArrayView2<f32>, carry: ArrayView4<f32>) -> (Array2<f32>, Array4<f32>) {
        let rows = x.nrows();
        assert_eq!(
            carry.dim(),
            self.carry_shape(rows),
            "Recurrent state has shape {:?}, expected {:?}",
            carry.dim(),
            self.carry_shape(rows)
        );
        assert_eq!(params.layers.len(), self.n_layers, "RNN parameter tree has wrong depth");

        let mut new_carry = Array4::zeros(carry.raw_dim());
        let mut out = x.to_owned();

        for (layer, layer_params) in params.layers.iter().enumerate() {
            let kind = CellKind::of(layer_params);
            assert_eq!(
                kind, self.kind,
                "RNN layer {} holds {:?} parameters, expected {:?}",
                layer, kind, self.kind
            );
            let input_size = self.layer_input_size(layer);
            match layer_params {
                CellParams::Gru(p) => {
                    let cell = GruCell::new(input_size, self.hidden_size);
                    let h = carry.slice(s![.., layer, 0, ..]);
                    out = cell.step(p, out.view(), h);
                    new_carry.slice_mut(s![.., layer, 0, ..]).assign(&out);
                }
                CellParams::Lstm(p) => {
                    let cell = LstmCell::new(input_size, self.hidden_size);
                    let c = carry.slice(s![.., layer, 0, ..]);
                    let h = carry.slice(s![.., layer, 1, ..]);
                    let (c_t, h_t) = cell.step(p, out.view(), c, h);
                    new_carry.slice_mut(s![.., layer, 0, ..]).assign(&c_t);
                    new_carry.slice_mut(s![.., layer, 1, ..]).assign(&h_t);
                    out = h_t;
                }
            }
        }

        (out, new_carry)
    }
}

impl Module for Rnn {
    type Params = RnnParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> RnnParams {
        let layers = (0..self.n_layers)
            .map(|layer| {
                let input_size = self.layer_input_size(layer);
                match self.kind {
                    CellKind::Gru => CellParams::Gru(GruCell::new(input_size, self.hidden_size).init_params(rng)),
                    CellKind::Lstm => CellParams::Lstm(LstmCell::new(input_size, self.hidden_size).init_params(rng)),
                }
            })
            .collect();
        RnnParams { layers }
    }
}

impl ParamCount for CellParams {
    fn num_parameters(&self) -> usize {
        match self {
            CellParams::Gru(p) => p.num_parameters(),
            CellParams::Lstm(p) => p.num_parameters(),
        }
    }
}

impl ParamCount for RnnParams {
    fn num_parameters(&self) -> usize {
        self.layers.num_parameters()
    }
}

/// Glorot-style uniform kernel with limit `sqrt(1 / fan)`
pub(crate) fn uniform_kernel<R: Rng + ?Sized>(shape: (usize, usize), fan: usize, rng: &mut R) -> Array2<f32> {
    let scale = (1.0 / fan as f32).sqrt();
    Array2::random_using(shape, Uniform::new_inclusive(-scale, scale), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_carry_shape_per_cell_kind() {
        assert_eq!(Rnn::new(CellKind::Gru, 8, 4, 2).carry_shape(3), (3, 2, 1, 4));
        assert_eq!(Rnn::new(CellKind::Lstm, 8, 4, 1).carry_shape(1), (1, 1, 2, 4));
    }

    #[test]
    fn test_stacked_lstm_updates_every_layer() {
        let rnn = Rnn::new(CellKind::Lstm, 5, 4, 2);
        let params = rnn.init_params(&mut StdRng::seed_from_u64(11));
        let x = Array2::from_elem((2, 5), 1.0);
        let carry = rnn.initialize_carry(2);

        let (out, new_carry) = rnn.apply(&params, x.view(), carry.view());
        assert_eq!(out.dim(), (2, 4));
        assert_eq!(new_carry.dim(), (2, 2, 2, 4));
        // Top layer hidden slot is the output
        assert_eq!(new_carry.slice(s![.., 1, 1, ..]), out);
        for layer in 0..2 {
            assert!(new_carry.slice(s![.., layer, 0, ..]).iter().any(|&v| v != 0.0));
        }
    }

    #[test]
    fn test_gru_output_depends_on_carry() {
        let rnn = Rnn::new(CellKind::Gru, 3, 4, 1);
        let params = rnn.init_params(&mut StdRng::seed_from_u64(5));
        let x = Array2::from_elem((1, 3), 0.3);

        let (_, carry) = rnn.apply(&params, x.view(), rnn.initialize_carry(1).view());
        let (first, _) = rnn.apply(&params, x.view(), rnn.initialize_carry(1).view());
        let (second, _) = rnn.apply(&params, x.view(), carry.view());
        assert_ne!(first, second);
    }

    #[test]
    #[should_panic(expected = "Recurrent state has shape")]
    fn test_rejects_carry_with_wrong_rows() {
        let rnn = Rnn::new(CellKind::Gru, 3, 4, 1);
        let params = rnn.init_params(&mut StdRng::seed_from_u64(0));
        let x = Array2::zeros((2, 3));
        rnn.apply(&params, x.view(), rnn.initialize_carry(1).view());
    }

    #[test]
    #[should_panic(expected = "holds Lstm parameters, expected Gru")]
    fn test_rejects_params_of_other_cell_kind() {
        let gru = Rnn::new(CellKind::Gru, 3, 4, 1);
        let lstm = Rnn::new(CellKind::Lstm, 3, 4, 1);
        let params = lstm.init_params(&mut StdRng::seed_from_u64(0));
        gru.apply(&params, Array2::zeros((1, 3)).view(), gru.initialize_carry(1).view());
    }
}
