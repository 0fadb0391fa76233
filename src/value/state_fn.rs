use ndarray::{Array1, ArrayD, ArrayViewD, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::graph::{GraphObs, AGENT_NODE_TYPE};
use crate::layers::{Dense, DenseParams, FeatureModule, GnnParams, GraphTransformer, Mlp, MlpParams, Module, ParamCount};
use super::mean_pool;

/// Centralized, non-recurrent state-value function
///
/// Mean-pools the agent embeddings into one team vector and runs it through
/// the head, optionally followed by a one-unit value projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFn {
    gnn: GraphTransformer,
    head: Mlp,
    value: Dense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFnParams {
    pub gnn: GnnParams,
    pub head: MlpParams,
    pub value: DenseParams,
}

impl StateFn {
    pub fn new(gnn: GraphTransformer, head: Mlp) -> Self {
        assert_eq!(head.input_size(), gnn.out_dim, "Head must accept GNN embeddings");
        let value = Dense::linear(head.output_size(), 1);
        StateFn { gnn, head, value }
    }

    pub fn head(&self) -> &Mlp {
        &self.head
    }

    /// Team features, or the team value when `get_value` is set
    ///
    /// `rnn_state` is ignored: it is accepted so this function shares the call
    /// shape of the recurrent variants, and it is returned unchanged.
    /// The output has the head width, or width 1 with `get_value`.
    pub fn apply(
        &self,
        params: &StateFnParams,
        graph: &GraphObs,
        rnn_state: ArrayViewD<f32>,
        n_agents: usize,
        get_value: bool,
    ) -> (Array1<f32>, ArrayD<f32>) {
        let x = self.gnn.apply(&params.gnn, graph, AGENT_NODE_TYPE, n_agents);
        let x = mean_pool(x.view());
        let mut x = self.head.apply(&params.head, x.view());

        if get_value {
            x = self.value.apply(&params.value, x.view());
        }

        (x.index_axis_move(Axis(0), 0), rnn_state.to_owned())
    }
}

impl Module for StateFn {
    type Params = StateFnParams;

    fn init_params<R: Rng + ?Sized>(&self, rng: &mut R) -> StateFnParams {
        StateFnParams {
            gnn: self.gnn.init_params(rng),
            head: self.head.init_params(rng),
            value: self.value.init_params(rng),
        }
    }
}

impl ParamCount for StateFnParams {
    fn num_parameters(&self) -> usize {
        self.gnn.num_parameters() + self.head.num_parameters() + self.value.num_parameters()
    }
}
