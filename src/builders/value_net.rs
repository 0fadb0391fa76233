use crate::value::{ValueNet, ValueNetConfig};
use crate::error::{Result, PhalanxError};

/// Builder for constructing value networks with a fluent API
#[derive(Debug, Clone, Default)]
pub struct ValueNetBuilder {
    node_dim: Option<usize>,
    edge_dim: Option<usize>,
    n_agents: Option<usize>,
    n_out: Option<usize>,
    use_rnn: Option<bool>,
    rnn_layers: Option<usize>,
    gnn_layers: Option<usize>,
    gnn_out_dim: Option<usize>,
    use_lstm: bool,
    use_ef: bool,
    decompose: bool,
    use_global_info: bool,
}

impl ValueNetBuilder {
    /// Create a new value network builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Width of the node features
    pub fn node_dim(mut self, node_dim: usize) -> Self {
        self.node_dim = Some(node_dim);
        self
    }

    /// Width of the edge features
    pub fn edge_dim(mut self, edge_dim: usize) -> Self {
        self.edge_dim = Some(edge_dim);
        self
    }

    pub fn n_agents(mut self, n_agents: usize) -> Self {
        self.n_agents = Some(n_agents);
        self
    }

    /// Width of the value output
    pub fn n_out(mut self, n_out: usize) -> Self {
        self.n_out = Some(n_out);
        self
    }

    /// Add a GRU memory with `layers` stacked cells
    pub fn with_gru(mut self, layers: usize) -> Self {
        self.use_rnn = Some(true);
        self.use_lstm = false;
        self.rnn_layers = Some(layers);
        self
    }

    /// Add an LSTM memory with `layers` stacked cells
    pub fn with_lstm(mut self, layers: usize) -> Self {
        self.use_rnn = Some(true);
        self.use_lstm = true;
        self.rnn_layers = Some(layers);
        self
    }

    pub fn without_rnn(mut self) -> Self {
        self.use_rnn = Some(false);
        self
    }

    /// Graph transformer depth and embedding width
    pub fn gnn(mut self, layers: usize, out_dim: usize) -> Self {
        self.gnn_layers = Some(layers);
        self.gnn_out_dim = Some(out_dim);
        self
    }

    /// Condition the value on a latent code
    pub fn latent_conditioned(mut self, enabled: bool) -> Self {
        self.use_ef = enabled;
        self
    }

    /// Produce one value per agent
    pub fn decomposed(mut self, use_global_info: bool) -> Self {
        self.decompose = true;
        self.use_global_info = use_global_info;
        self
    }

    /// The configuration this builder describes
    pub fn config(&self) -> Result<ValueNetConfig> {
        let required = |value: Option<usize>, name: &str| {
            value.ok_or_else(|| PhalanxError::InvalidParameter {
                name: name.to_string(),
                reason: "not specified".to_string(),
            })
        };

        let mut config = ValueNetConfig::new(
            required(self.node_dim, "node_dim")?,
            required(self.edge_dim, "edge_dim")?,
            required(self.n_agents, "n_agents")?,
        );
        config.n_out = self.n_out.unwrap_or(config.n_out);
        config.use_rnn = self.use_rnn.unwrap_or(config.use_rnn);
        config.rnn_layers = self.rnn_layers.unwrap_or(config.rnn_layers);
        config.gnn_layers = self.gnn_layers.unwrap_or(config.gnn_layers);
        config.gnn_out_dim = self.gnn_out_dim.unwrap_or(config.gnn_out_dim);
        config.use_lstm = self.use_lstm;
        config.use_ef = self.use_ef;
        config.decompose = self.decompose;
        config.use_global_info = self.use_global_info;
        Ok(config)
    }

    /// Build the value network
    pub fn build(self) -> Result<ValueNet> {
        ValueNet::new(self.config()?)
    }
}
