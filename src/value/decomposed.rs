use ndarray::{s, Array2, ArrayD, ArrayView1, ArrayViewD};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::graph::{GraphObs, AGENT_NODE_TYPE};
use crate::layers::{Dense, FeatureModule, GraphTransformer, Mlp, Module, Rnn};
use super::latent::{encode_latent, LatentEncoder};
use super::params::ValueFnParams;
use super::{from_carry, hstack, mean_pool, to_carry};

/// Decomposed (per-agent) recurrent value function
///
/// Agent embeddings are not pooled: every agent keeps its own row through the
/// head, the optional RNN and the output projection. With `use_global_info`
/// the mean embedding of the team is appended to every row.
///
/// With a recurrent cell the state has shape
/// `(n_agents, n_layers, n_carries, hidden)`, one carry per agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecRStateFn {
    gnn: GraphTransformer,
    latent: Option<LatentEncoder>,
    head: Mlp,
    rnn: Option<Rnn>,
    out: Dense,
    use_global_info: bool,
}

impl DecRStateFn {
    /// `head` must accept `gnn.out_dim` (doubled with `use_global_info`, plus
    /// `nz` with a latent encoder).
    pub fn new(
        gnn: GraphTransformer,
        head: Mlp,
        n_out: usize,
        rnn: Option<Rnn>,
        latent: Option<LatentEncoder>,
        use_global_info: bool,
    ) -> Self {
        let embed = if use_global_info { 2 * gnn.out_dim } else { gnn.out_dim };
        let head_in = embed + latent.as_ref().map_or(0, |z| z.nz);
        assert_eq!(head.input_size(), head_in, "Head input width mismatch");

        let feat = match &rnn {
            Some(rnn) => {
                assert_eq!(rnn.input_size, head.output_size(), "RNN input width mismatch");
                rnn.hidden_size
            }
            None => head.output_size(),
        };

        DecRStateFn { gnn, latent, head, rnn, out: Dense::linear(feat, n_out), use_global_info }
    }

    pub fn n_out(&self) -> usize {
        self.out.output_size
    }

    pub fn use_global_info(&self) -> bool {
        self.use_global_info
    }

    pub fn rnn(&self) -> Option<&Rnn> {
        self.rnn.as_ref()
    }

    pub fn latent(&self) -> Option<&LatentEncoder> {
        self.latent.as_ref()
    }

    /// Caller-facing recurrent state shape for `n_agents`, when recurrent
    pub fn state_shape(&self, n_agents: usize) -> Option<Vec<usize>> {
        self.rnn.as_ref().map(|rnn| {
            let (rows, layers, carries, hidden) = rnn.carry_shape(n_agents);
            vec![rows, layers, carries, hidden]
        })
    }

    /// Per-agent values `(n_agents, n_out)` and the next recurrent state
    ///
    /// `z`, when latent-conditioned, holds one code per agent.
    ///
    /// # Panics
    /// Whenever a stage does not produce exactly `n_agents` rows, or on the
    /// latent and state contract violations of [`RStateFn`](super::RStateFn).
    pub fn apply(
        &self,
        params: &ValueFnParams,
        graph: &GraphObs,
        rnn_state: ArrayViewD<f32>,
        n_agents: usize,
        z: Option<ArrayView1<f32>>,
    ) -> (Array2<f32>, ArrayD<f32>) {
        let x = self.gnn.apply(&params.gnn, graph, AGENT_NODE_TYPE, n_agents);
        assert_eq!(x.nrows(), n_agents, "GNN must embed every agent");

        let mut x = if self.use_global_info {
            let width = x.ncols();
            let global = mean_pool(x.view());
            let mut fused = Array2::zeros((n_agents, 2 * width));
            fused.slice_mut(s![.., ..width]).assign(&x);
            fused.slice_mut(s![.., width..]).assign(&global);
            fused
        } else {
            x
        };

        if let Some(encoder) = &self.latent {
            let z_enc = encode_latent(encoder, params.latent.as_ref(), z, n_agents);
            x = hstack(x.view(), z_enc.view());
        }

        let x = self.head.apply(&params.head, x.view());
        assert_eq!(x.nrows(), n_agents, "Head must keep one row per agent");

        let (x, rnn_state) = match (&self.rnn, &params.rnn) {
            (Some(rnn), Some(rnn_params)) => {
                let carry_shape = rnn.carry_shape(n_agents);
                let (rows, layers, carries, hidden) = carry_shape;
                let shape = [rows, layers, carries, hidden];
                let carry = to_carry(&rnn_state, &shape, carry_shape);
                let (x, carry) = rnn.apply(rnn_params, x.view(), carry.view());
                (x, from_carry(carry, &shape))
            }
            (Some(_), None) => panic!("Recurrent value function needs RNN parameters"),
            (None, _) => (x, rnn_state.to_owned()),
        };

        let x = self.out.apply(&params.out, x.view());
        assert_eq!(x.dim(), (n_agents, self.n_out()), "Decomposed value has the wrong shape");
        log::trace!("decomposed value {:?}", x.dim());

        (x, rnn_state)
    }
}

impl Module for DecRStateFn {
    type Params = ValueFnParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> ValueFnParams {
        ValueFnParams {
            gnn: self.gnn.init_params(rng),
            latent: self.latent.as_ref().map(|z| z.init_params(rng)),
            head: self.head.init_params(rng),
            rnn: self.rnn.as_ref().map(|rnn| rnn.init_params(rng)),
            out: self.out.init_params(rng),
        }
    }
}
