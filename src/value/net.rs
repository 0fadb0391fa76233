use std::fs;
use std::path::Path;

use ndarray::{ArrayD, ArrayView1, ArrayViewD, Axis, IxDyn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{PhalanxError, Result};
use crate::graph::GraphObs;
use crate::layers::{CellKind, FeatureModule, GraphTransformer, Mlp, Module, ParamCount, Rnn};
use super::decomposed::DecRStateFn;
use super::latent::LatentEncoder;
use super::params::ValueFnParams;
use super::recurrent::RStateFn;

/// Message width inside the graph transformer
pub const GNN_MSG_DIM: usize = 32;
/// Attention heads per graph transformer layer
pub const GNN_HEADS: usize = 3;
/// Hidden sizes of the value head
pub const HEAD_SIZES: [usize; 2] = [64, 64];
/// Features of every recurrent cell
pub const RNN_FEATURES: usize = 64;
/// Width of the latent embedding
pub const LATENT_NZ: usize = 8;
pub const LATENT_MEAN: f32 = 1.0;
pub const LATENT_SCALE: f32 = 1.0;

/// Flat hyperparameters of a [`ValueNet`]
///
/// Every flag is independent; no combination is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueNetConfig {
    pub node_dim: usize,
    pub edge_dim: usize,
    pub n_agents: usize,
    #[serde(default = "default_one")]
    pub n_out: usize,
    #[serde(default = "default_true")]
    pub use_rnn: bool,
    #[serde(default = "default_one")]
    pub rnn_layers: usize,
    #[serde(default = "default_one")]
    pub gnn_layers: usize,
    #[serde(default = "default_gnn_out_dim")]
    pub gnn_out_dim: usize,
    #[serde(default)]
    pub use_lstm: bool,
    #[serde(default)]
    pub use_ef: bool,
    #[serde(default)]
    pub decompose: bool,
    #[serde(default)]
    pub use_global_info: bool,
}

fn default_one() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_gnn_out_dim() -> usize {
    16
}

impl ValueNetConfig {
    /// Configuration with default values for everything but the input sizes
    pub fn new(node_dim: usize, edge_dim: usize, n_agents: usize) -> Self {
        ValueNetConfig {
            node_dim,
            edge_dim,
            n_agents,
            n_out: default_one(),
            use_rnn: default_true(),
            rnn_layers: default_one(),
            gnn_layers: default_one(),
            gnn_out_dim: default_gnn_out_dim(),
            use_lstm: false,
            use_ef: false,
            decompose: false,
            use_global_info: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject zero-sized dimensions
    pub fn validate(&self) -> Result<()> {
        let mut sizes = vec![
            ("node_dim", self.node_dim),
            ("n_agents", self.n_agents),
            ("n_out", self.n_out),
            ("gnn_layers", self.gnn_layers),
            ("gnn_out_dim", self.gnn_out_dim),
        ];
        if self.use_rnn {
            sizes.push(("rnn_layers", self.rnn_layers));
        }

        match sizes.into_iter().find(|&(_, size)| size == 0) {
            Some((name, _)) => Err(PhalanxError::invalid_parameter(name, "must be positive")),
            None => Ok(()),
        }
    }

    pub fn cell_kind(&self) -> CellKind {
        if self.use_lstm { CellKind::Lstm } else { CellKind::Gru }
    }
}

fn gnn_factory(config: &ValueNetConfig) -> GraphTransformer {
    GraphTransformer::new(
        config.node_dim,
        config.edge_dim,
        GNN_MSG_DIM,
        config.gnn_out_dim,
        GNN_HEADS,
        config.gnn_layers,
    )
}

fn head_factory(input_size: usize) -> Mlp {
    Mlp::new(input_size, &HEAD_SIZES, Activation::Relu, true)
}

fn rnn_factory(config: &ValueNetConfig, input_size: usize) -> Option<Rnn> {
    config
        .use_rnn
        .then(|| Rnn::new(config.cell_kind(), input_size, RNN_FEATURES, config.rnn_layers))
}

fn latent_factory(config: &ValueNetConfig) -> Option<LatentEncoder> {
    config
        .use_ef
        .then(|| LatentEncoder::new(LATENT_NZ, LATENT_MEAN, LATENT_SCALE))
}

/// The assembled value function
#[derive(Debug, Clone, Serialize, Deserialize)]
enum ValueFn {
    Centralized(RStateFn),
    Decomposed(DecRStateFn),
}

/// Value network facade
///
/// Wires a graph transformer, an MLP head, an optional recurrent cell and an
/// optional latent encoder into a centralized or decomposed value function.
/// It never owns parameters: `init_params` creates them and `get_value`
/// borrows them.
///
/// ```rust
/// use ndarray::Array2;
/// use phalanx::graph::GraphObs;
/// use phalanx::value::{ValueNet, ValueNetConfig};
///
/// let mut config = ValueNetConfig::new(3, 2, 2);
/// config.use_rnn = false;
/// let net = ValueNet::new(config).unwrap();
/// let params = net.init_params(0);
///
/// let graph = GraphObs::without_edges(Array2::ones((2, 3)), 2, vec![0, 0]).unwrap();
/// let state = net.initialize_carry(0);
/// let (value, next_state) = net.get_value(&params, &graph, state.view(), None);
/// assert_eq!(value.shape(), &[1]);
/// assert_eq!(next_state, state);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueNet {
    config: ValueNetConfig,
    net: ValueFn,
}

impl ValueNet {
    pub fn new(config: ValueNetConfig) -> Result<Self> {
        config.validate()?;

        let gnn = gnn_factory(&config);
        let latent = latent_factory(&config);
        let nz = latent.as_ref().map_or(0, |z| z.nz);

        let net = if config.decompose {
            let embed = if config.use_global_info { 2 * config.gnn_out_dim } else { config.gnn_out_dim };
            let head = head_factory(embed + nz);
            let rnn = rnn_factory(&config, head.output_size());
            ValueFn::Decomposed(DecRStateFn::new(gnn, head, config.n_out, rnn, latent, config.use_global_info))
        } else {
            let head = head_factory(config.gnn_out_dim + nz);
            let rnn = rnn_factory(&config, head.output_size());
            ValueFn::Centralized(RStateFn::new(gnn, head, config.n_out, rnn, latent))
        };

        log::debug!(
            "assembled {} value net: n_agents={}, rnn={}, latent={}, global_info={}",
            if config.decompose { "decomposed" } else { "centralized" },
            config.n_agents,
            if config.use_rnn { format!("{:?}x{}", config.cell_kind(), config.rnn_layers) } else { "off".to_string() },
            config.use_ef,
            config.use_global_info,
        );

        Ok(ValueNet { config, net })
    }

    pub fn config(&self) -> &ValueNetConfig {
        &self.config
    }

    pub fn n_agents(&self) -> usize {
        self.config.n_agents
    }

    pub fn is_recurrent(&self) -> bool {
        self.config.use_rnn
    }

    pub fn is_decomposed(&self) -> bool {
        self.config.decompose
    }

    /// Draw a fresh parameter tree from `seed`
    pub fn init_params(&self, seed: u64) -> ValueFnParams {
        let mut rng = StdRng::seed_from_u64(seed);
        let params = match &self.net {
            ValueFn::Centralized(net) => net.init_params(&mut rng),
            ValueFn::Decomposed(net) => net.init_params(&mut rng),
        };
        log::debug!("initialized {} value parameters from seed {}", params.num_parameters(), seed);
        params
    }

    /// Shape of the recurrent state this network expects
    pub fn state_shape(&self) -> Vec<usize> {
        let shape = match &self.net {
            ValueFn::Centralized(net) => net.state_shape(),
            ValueFn::Decomposed(net) => net.state_shape(self.config.n_agents),
        };
        shape.unwrap_or_else(|| vec![self.config.gnn_out_dim])
    }

    /// Initial recurrent state
    ///
    /// Zeros of [`state_shape`](Self::state_shape): `(gnn_out_dim,)` without
    /// recurrence, one zero carry per row otherwise. The zero initializer does
    /// not consume randomness, so `_key` does not influence the result.
    pub fn initialize_carry(&self, _key: u64) -> ArrayD<f32> {
        ArrayD::zeros(IxDyn(&self.state_shape()))
    }

    /// Value of `graph` and the next recurrent state
    ///
    /// Centralized nets return `(n_out,)`, decomposed nets `(n_agents, n_out)`.
    /// Without recurrence the state comes back unchanged. `z` holds one latent
    /// code (centralized) or one per agent (decomposed) and is required exactly
    /// when the net is latent-conditioned.
    pub fn get_value(
        &self,
        params: &ValueFnParams,
        graph: &GraphObs,
        rnn_state: ArrayViewD<f32>,
        z: Option<ArrayView1<f32>>,
    ) -> (ArrayD<f32>, ArrayD<f32>) {
        let n_agents = self.config.n_agents;
        match &self.net {
            ValueFn::Centralized(net) => {
                let (value, state) = net.apply(params, graph, rnn_state, n_agents, z);
                (value.index_axis_move(Axis(0), 0).into_dyn(), state)
            }
            ValueFn::Decomposed(net) => {
                let (value, state) = net.apply(params, graph, rnn_state, n_agents, z);
                (value.into_dyn(), state)
            }
        }
    }
}
