use ndarray::{Array2, ArrayD, ArrayView1, ArrayViewD};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::graph::{GraphObs, AGENT_NODE_TYPE};
use crate::layers::{Dense, FeatureModule, GraphTransformer, Mlp, Module, Rnn};
use super::latent::{encode_latent, LatentEncoder};
use super::params::ValueFnParams;
use super::{from_carry, hstack, mean_pool, to_carry};

/// Centralized state-value function with optional recurrence and latent conditioning
///
/// Pipeline: GNN, mean-pool to `(1, gnn_out)`, optional latent concat, head,
/// optional RNN, dense projection to `(1, n_out)`.
///
/// With a recurrent cell the state has shape `(n_layers, n_carries, hidden)`;
/// without one it is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RStateFn {
    gnn: GraphTransformer,
    latent: Option<LatentEncoder>,
    head: Mlp,
    rnn: Option<Rnn>,
    out: Dense,
}

impl RStateFn {
    /// `head` must accept `gnn.out_dim` (plus `nz` with a latent encoder) and
    /// `rnn`, if any, must accept the head output.
    pub fn new(gnn: GraphTransformer, head: Mlp, n_out: usize, rnn: Option<Rnn>, latent: Option<LatentEncoder>) -> Self {
        let head_in = gnn.out_dim + latent.as_ref().map_or(0, |z| z.nz);
        assert_eq!(head.input_size(), head_in, "Head input width mismatch");

        let feat = match &rnn {
            Some(rnn) => {
                assert_eq!(rnn.input_size, head.output_size(), "RNN input width mismatch");
                rnn.hidden_size
            }
            None => head.output_size(),
        };

        RStateFn { gnn, latent, head, rnn, out: Dense::linear(feat, n_out) }
    }

    pub fn n_out(&self) -> usize {
        self.out.output_size
    }

    pub fn rnn(&self) -> Option<&Rnn> {
        self.rnn.as_ref()
    }

    pub fn latent(&self) -> Option<&LatentEncoder> {
        self.latent.as_ref()
    }

    /// Caller-facing recurrent state shape, when recurrent
    pub fn state_shape(&self) -> Option<Vec<usize>> {
        self.rnn.as_ref().map(|rnn| {
            let (_, layers, carries, hidden) = rnn.carry_shape(1);
            vec![layers, carries, hidden]
        })
    }

    /// Team value `(1, n_out)` and the next recurrent state
    ///
    /// # Panics
    /// When a latent encoder is configured and `z` is missing or not a single
    /// entry, or when `rnn_state` does not have [`state_shape`](Self::state_shape).
    pub fn apply(
        &self,
        params: &ValueFnParams,
        graph: &GraphObs,
        rnn_state: ArrayViewD<f32>,
        n_agents: usize,
        z: Option<ArrayView1<f32>>,
    ) -> (Array2<f32>, ArrayD<f32>) {
        let x = self.gnn.apply(&params.gnn, graph, AGENT_NODE_TYPE, n_agents);
        let mut x = mean_pool(x.view());

        if let Some(encoder) = &self.latent {
            let z_enc = encode_latent(encoder, params.latent.as_ref(), z, 1);
            x = hstack(x.view(), z_enc.view());
        }

        let x = self.head.apply(&params.head, x.view());

        let (x, rnn_state) = match (&self.rnn, &params.rnn) {
            (Some(rnn), Some(rnn_params)) => {
                let (_, layers, carries, hidden) = rnn.carry_shape(1);
                let shape = [layers, carries, hidden];
                let carry = to_carry(&rnn_state, &shape, rnn.carry_shape(1));
                let (x, carry) = rnn.apply(rnn_params, x.view(), carry.view());
                (x, from_carry(carry, &shape))
            }
            (Some(_), None) => panic!("Recurrent value function needs RNN parameters"),
            (None, _) => (x, rnn_state.to_owned()),
        };

        let x = self.out.apply(&params.out, x.view());
        log::trace!("centralized value {:?}", x.dim());
        (x, rnn_state)
    }
}

impl Module for RStateFn {
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
